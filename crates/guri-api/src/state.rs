use chrono::Duration;
use std::sync::Arc;

use guri_persist::PersistenceClient;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::uploads::UploadStore;

/// Shared application state passed to all handlers
///
/// Everything is behind `Arc`; handlers receive `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub tokens: Arc<TokenKeys>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(config: Config, persist: Arc<dyn PersistenceClient>) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, Duration::hours(config.auth.token_ttl_hours));
        let uploads = UploadStore::new(&config.uploads, &config.server.public_base_url);

        Self {
            config: Arc::new(config),
            persist,
            tokens: Arc::new(tokens),
            uploads: Arc::new(uploads),
        }
    }
}
