use std::sync::Arc;

use crate::infra::{config::AppConfig, db::DbPool, middleware::RateLimiter};

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Arc<AppConfig>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db_pool: DbPool, config: AppConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Self {
            db_pool,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
