use jollof_session::SessionService;
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: SessionService,
    pub auth: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: Config, service: SessionService) -> Self {
        let auth = Arc::new(TokenVerifier::new(&config.jwt_secret));
        Self {
            config: Arc::new(config),
            service,
            auth,
        }
    }
}
