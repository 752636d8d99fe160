use crate::auth::session::CookieSettings;
use crate::auth::token::TokenService;
use crate::config::Config;
use crate::store::Store;

/// Immutable per-process state shared with every request via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: TokenService,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenService, cookies: CookieSettings) -> Self {
        Self {
            store,
            tokens,
            cookies,
        }
    }

    pub fn from_config(config: &Config, store: Store) -> Self {
        Self::new(
            store,
            TokenService::new(
                config.jwt_secret_key.clone(),
                config.jwt_refresh_secret_key.clone(),
            ),
            CookieSettings {
                secure: config.secure_cookies,
            },
        )
    }
}
