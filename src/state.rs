//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::FileStore;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<EnvironmentConfig>,
    /// None when file-store credentials are absent; uploads then skip the
    /// external copy and the rest of the pipeline proceeds normally.
    pub file_store: Option<Arc<dyn FileStore>>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        file_store: Option<Arc<dyn FileStore>>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            file_store,
        }
    }
}
