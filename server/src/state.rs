use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::Config;

/// Shared state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(backend: BackendClient, config: Config) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.backend.pool
    }
}
