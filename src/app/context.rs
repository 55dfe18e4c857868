use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{NewsError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::repository::NewsRepository;
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub repository: NewsRepository<SqliteStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.storage.db_path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!("Opened article cache at {}", db_path.display());
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.api)?);
        let repository = NewsRepository::new(store.clone(), fetcher, config.repository_options());

        Ok(Self {
            config,
            store,
            repository,
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsError::Other("Could not find data directory".into()))?;
        let app_dir = data_dir.join("flashnews");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("flashnews.db"))
    }
}
