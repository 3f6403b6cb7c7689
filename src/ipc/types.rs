use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::client::RecordStoreClient;
use crate::config::{Backend, Config};
use crate::session::Session;
use crate::store::{InMemoryStore, SqliteStore, StudentStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub session: Session,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let (store, workspace): (Arc<dyn StudentStore>, Option<PathBuf>) = match config.backend {
            Backend::Sqlite => {
                let Some(path) = config.workspace.clone() else {
                    anyhow::bail!("sqlite backend needs a workspace");
                };
                let store: Arc<dyn StudentStore> = Arc::new(SqliteStore::open(&path)?);
                (store, Some(path))
            }
            Backend::Memory => {
                let store: Arc<dyn StudentStore> = if config.seed {
                    Arc::new(InMemoryStore::seeded(config.latency))
                } else {
                    Arc::new(InMemoryStore::new(config.latency))
                };
                (store, None)
            }
        };
        let session = Session::new(build_client(&config, store));
        Ok(AppState {
            config,
            workspace,
            session,
        })
    }

    /// Swaps the backing store for `path`'s SQLite file and starts a fresh
    /// session against it.
    pub fn select_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let store = SqliteStore::open(&path)?;
        self.session = Session::new(build_client(&self.config, Arc::new(store)));
        self.workspace = Some(path);
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        self.config.latency
    }
}

fn build_client(config: &Config, store: Arc<dyn StudentStore>) -> RecordStoreClient {
    RecordStoreClient::new(store)
        .with_invalidation(config.invalidation)
        .with_retry(config.retry)
}
