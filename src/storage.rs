//! Result persistence.
//!
//! Stores deal in raw bytes on the way out so the repair pipeline sees exactly
//! what was written, corrupt or not.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

use crate::domain::DivinationResult;
use crate::error::DivinationError;

#[async_trait]
pub trait ResultStore: Send + Sync {
  async fn save(&self, result: &DivinationResult) -> Result<(), DivinationError>;
  async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, DivinationError>;
  /// Oldest first.
  async fn list_ids(&self) -> Result<Vec<String>, DivinationError>;
  /// `Ok(false)` when there was nothing to delete.
  async fn delete(&self, id: &str) -> Result<bool, DivinationError>;
}

/// Ids become file names, so only a conservative alphabet is accepted.
pub fn is_valid_id(id: &str) -> bool {
  !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn check_id(id: &str) -> Result<(), DivinationError> {
  if is_valid_id(id) {
    Ok(())
  } else {
    Err(DivinationError::NotFound { id: id.to_string() })
  }
}

/// Process-local store, used when no results directory is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
  inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
  order: Vec<String>,
  blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Writes raw bytes under `id`, bypassing serialization.
  pub async fn put_raw(&self, id: &str, bytes: Vec<u8>) {
    let mut inner = self.inner.write().await;
    if inner.blobs.insert(id.to_string(), bytes).is_none() {
      inner.order.push(id.to_string());
    }
  }
}

#[async_trait]
impl ResultStore for MemoryStore {
  async fn save(&self, result: &DivinationResult) -> Result<(), DivinationError> {
    check_id(&result.id)?;
    let bytes = serde_json::to_vec(result).map_err(|e| DivinationError::Storage { message: e.to_string() })?;
    self.put_raw(&result.id, bytes).await;
    Ok(())
  }

  async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, DivinationError> {
    Ok(self.inner.read().await.blobs.get(id).cloned())
  }

  async fn list_ids(&self) -> Result<Vec<String>, DivinationError> {
    Ok(self.inner.read().await.order.clone())
  }

  async fn delete(&self, id: &str) -> Result<bool, DivinationError> {
    let mut inner = self.inner.write().await;
    let existed = inner.blobs.remove(id).is_some();
    inner.order.retain(|x| x != id);
    Ok(existed)
  }
}

const INDEX_FILE: &str = "index.json";

/// One `<id>.json` per result plus an `index.json` holding the id order.
pub struct FileStore {
  dir: PathBuf,
  // serializes index read-modify-write
  index_lock: Mutex<()>,
}

impl FileStore {
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self, DivinationError> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    debug!(target: "storage", dir = %dir.display(), "file store ready");
    Ok(Self { dir, index_lock: Mutex::new(()) })
  }

  fn path_for(&self, id: &str) -> PathBuf {
    self.dir.join(format!("{id}.json"))
  }

  async fn read_index(&self) -> Result<Vec<String>, DivinationError> {
    match tokio::fs::read(self.dir.join(INDEX_FILE)).await {
      Ok(bytes) => match serde_json::from_slice::<Vec<String>>(&bytes) {
        Ok(ids) => Ok(ids),
        Err(e) => {
          warn!(target: "storage", error = %e, "index unreadable; rebuilding from directory");
          self.scan_ids().await
        }
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.scan_ids().await,
      Err(e) => Err(e.into()),
    }
  }

  /// Ids of every `<id>.json` on disk, by modification time.
  async fn scan_ids(&self) -> Result<Vec<String>, DivinationError> {
    let mut found = Vec::new();
    let mut entries = tokio::fs::read_dir(&self.dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
      if path.extension().and_then(|e| e.to_str()) != Some("json") || stem == "index" || !is_valid_id(stem) {
        continue;
      }
      let modified = entry.metadata().await.ok().and_then(|m| m.modified().ok());
      found.push((modified, stem.to_string()));
    }
    found.sort();
    Ok(found.into_iter().map(|(_, id)| id).collect())
  }

  async fn write_index(&self, ids: &[String]) -> Result<(), DivinationError> {
    let bytes = serde_json::to_vec(ids).map_err(|e| DivinationError::Storage { message: e.to_string() })?;
    write_atomic(&self.dir.join(INDEX_FILE), &bytes).await
  }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DivinationError> {
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, bytes).await?;
  tokio::fs::rename(&tmp, path).await?;
  Ok(())
}

#[async_trait]
impl ResultStore for FileStore {
  #[instrument(level = "debug", skip(self, result), fields(id = %result.id))]
  async fn save(&self, result: &DivinationResult) -> Result<(), DivinationError> {
    check_id(&result.id)?;
    let bytes = serde_json::to_vec_pretty(result).map_err(|e| DivinationError::Storage { message: e.to_string() })?;
    let _guard = self.index_lock.lock().await;
    write_atomic(&self.path_for(&result.id), &bytes).await?;
    let mut ids = self.read_index().await?;
    if !ids.iter().any(|x| *x == result.id) {
      ids.push(result.id.clone());
      self.write_index(&ids).await?;
    }
    debug!(target: "storage", bytes = bytes.len(), "saved");
    Ok(())
  }

  async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, DivinationError> {
    if !is_valid_id(id) {
      return Ok(None);
    }
    match tokio::fs::read(self.path_for(id)).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn list_ids(&self) -> Result<Vec<String>, DivinationError> {
    let _guard = self.index_lock.lock().await;
    self.read_index().await
  }

  #[instrument(level = "debug", skip(self))]
  async fn delete(&self, id: &str) -> Result<bool, DivinationError> {
    if !is_valid_id(id) {
      return Ok(false);
    }
    let _guard = self.index_lock.lock().await;
    let existed = match tokio::fs::remove_file(self.path_for(id)).await {
      Ok(()) => true,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
      Err(e) => return Err(e.into()),
    };
    let mut ids = self.read_index().await?;
    let before = ids.len();
    ids.retain(|x| x != id);
    if ids.len() != before {
      self.write_index(&ids).await?;
    }
    Ok(existed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Inputs, Section};

  #[test]
  fn id_alphabet() {
    assert!(is_valid_id("0b0f6c1e-6a8d-4a47-9d3b-2f1f8f1c2a10"));
    assert!(!is_valid_id("../etc/passwd"));
    assert!(!is_valid_id(""));
  }

  #[tokio::test]
  async fn memory_store_keeps_order_and_deletes() {
    let store = MemoryStore::new();
    let a = DivinationResult::new("tarot", Inputs::new(), vec![Section::new("a", "b")]);
    let b = DivinationResult::new("dream", Inputs::new(), vec![Section::new("c", "d")]);
    store.save(&a).await.unwrap();
    store.save(&b).await.unwrap();
    store.save(&a).await.unwrap();
    assert_eq!(store.list_ids().await.unwrap(), vec![a.id.clone(), b.id.clone()]);
    let bytes = store.load(&a.id).await.unwrap().unwrap();
    let back: DivinationResult = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, a);
    assert!(store.delete(&a.id).await.unwrap());
    assert!(!store.delete(&a.id).await.unwrap());
    assert_eq!(store.list_ids().await.unwrap(), vec![b.id]);
  }
}
