use missive_config::Config;
use missive_db::SharedStore;
use std::sync::Arc;

use crate::auth::AuthProvider;

/// Application context containing shared dependencies
#[derive(Clone)]
pub struct AppContext {
    pub store: SharedStore,
    pub auth: Arc<AuthProvider>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Creates a new application context
    pub fn new(store: SharedStore, config: Arc<Config>) -> Self {
        let auth = Arc::new(AuthProvider::new(&config.security));
        Self {
            store,
            auth,
            config,
        }
    }

    /// Salt for `log_safe_id`
    pub fn log_salt(&self) -> &str {
        &self.config.logging.hash_salt
    }
}
