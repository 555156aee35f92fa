//! FileStore against a real temporary directory.

use divination_backend::domain::{DivinationResult, Inputs, Section};
use divination_backend::storage::{FileStore, ResultStore};

fn reading(method: &str) -> DivinationResult {
  DivinationResult::new(method, Inputs::new(), vec![Section::new("总论", "平稳")])
}

#[tokio::test]
async fn save_load_list_delete() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path()).await.unwrap();
  let a = reading("tarot");
  let b = reading("bazi");
  store.save(&a).await.unwrap();
  store.save(&b).await.unwrap();

  assert!(dir.path().join(format!("{}.json", a.id)).exists());
  assert!(dir.path().join("index.json").exists());
  assert_eq!(store.list_ids().await.unwrap(), vec![a.id.clone(), b.id.clone()]);

  let bytes = store.load(&a.id).await.unwrap().unwrap();
  let back: DivinationResult = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(back, a);

  assert!(store.delete(&a.id).await.unwrap());
  assert!(!store.delete(&a.id).await.unwrap());
  assert_eq!(store.load(&a.id).await.unwrap(), None);
  assert_eq!(store.list_ids().await.unwrap(), vec![b.id]);
}

#[tokio::test]
async fn resaving_updates_in_place() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path()).await.unwrap();
  let a = reading("dream");
  store.save(&a).await.unwrap();
  let edited = a.replace_sections(vec![Section::new("更正", "新内容")]);
  store.save(&edited).await.unwrap();
  assert_eq!(store.list_ids().await.unwrap(), vec![a.id.clone()]);
  let back: DivinationResult = serde_json::from_slice(&store.load(&a.id).await.unwrap().unwrap()).unwrap();
  assert_eq!(back.sections[0].title, "更正");
}

#[tokio::test]
async fn missing_index_is_rebuilt_from_files() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path()).await.unwrap();
  let a = reading("qimen");
  store.save(&a).await.unwrap();
  std::fs::remove_file(dir.path().join("index.json")).unwrap();
  std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
  assert_eq!(store.list_ids().await.unwrap(), vec![a.id]);
}

#[tokio::test]
async fn path_like_ids_are_never_touched() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path()).await.unwrap();
  assert_eq!(store.load("../secret").await.unwrap(), None);
  assert!(!store.delete("../secret").await.unwrap());
  let mut bad = reading("tarot");
  bad.id = "../escape".into();
  assert!(store.save(&bad).await.is_err());
}
