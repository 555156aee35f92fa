//! Application state: engine config, method registry, compiled parsers,
//! the result store and the optional completion client.
//!
//! Built once at startup and shared behind an `Arc`. Nothing in here is
//! mutated after construction; the store does its own locking.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use crate::assembler::AssemblyContext;
use crate::completion::{ChatClient, Completion};
use crate::config::{load_config_from_env, EngineConfig};
use crate::error::DivinationError;
use crate::methods::MethodRegistry;
use crate::parser::SectionParser;
use crate::render::ShareFormatter;
use crate::storage::{FileStore, MemoryStore, ResultStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EngineConfig>,
    pub registry: Arc<MethodRegistry>,
    pub parser: Arc<SectionParser>,
    pub share: Arc<ShareFormatter>,
    pub store: Arc<dyn ResultStore>,
    pub completion: Option<Arc<dyn Completion>>,
}

impl AppState {
    /// Build state from env: load config, open the store, init the completion client.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, DivinationError> {
        let config = load_config_from_env().unwrap_or_default();

        let store: Arc<dyn ResultStore> = if config.storage.in_memory {
            info!(target: "divination", "Results kept in memory only.");
            Arc::new(MemoryStore::new())
        } else {
            info!(target: "divination", dir = %config.storage.results_dir.display(), "Results stored on disk.");
            Arc::new(FileStore::open(&config.storage.results_dir).await?)
        };

        // Build optional completion client (if API key present).
        let completion: Option<Arc<dyn Completion>> = match ChatClient::from_env(&config.completion) {
            Some(client) => {
                info!(target: "divination", base_url = %config.completion.base_url, model = %client.model(), "External completion enabled.");
                Some(Arc::new(client))
            }
            None => {
                info!(target: "divination", "External completion disabled (no DIVINATION_API_KEY). Using local generators.");
                None
            }
        };

        Self::with_parts(config, store, completion)
    }

    /// Explicit construction, used by `from_env` and by tests.
    pub fn with_parts(
        config: EngineConfig,
        store: Arc<dyn ResultStore>,
        completion: Option<Arc<dyn Completion>>,
    ) -> Result<Self, DivinationError> {
        let registry = MethodRegistry::new(&config.timeouts);
        for p in registry.iter() {
            info!(target: "divination", method = %p.id, timeout_secs = p.timeout.as_secs(), "Method registered");
        }
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            parser: Arc::new(SectionParser::new()?),
            share: Arc::new(ShareFormatter::new()?),
            store,
            completion,
        })
    }

    /// In-memory store, no completion client, default config.
    pub fn local() -> Result<Self, DivinationError> {
        Self::with_parts(EngineConfig::default(), Arc::new(MemoryStore::new()), None)
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn assembly(&self) -> AssemblyContext<'_> {
        AssemblyContext {
            registry: &self.registry,
            parser: &self.parser,
            completion: self.completion.as_deref(),
            prompts: &self.config.prompts,
            today: self.today(),
        }
    }
}
