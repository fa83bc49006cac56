//! Application state module
//!
//! Shared resources handed to every HTTP handler

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::DatabasePool;
use crate::middleware::RateLimitMiddleware;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Application state shared across all HTTP handlers
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub rate_limiter: RateLimitMiddleware,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings, pool: DatabasePool) -> Result<Self> {
        let rate_limiter = RateLimitMiddleware::new(&settings.rate_limit, true)?;
        let services = ServiceFactory::new(settings.clone(), pool);

        Ok(Self {
            services: Arc::new(services),
            rate_limiter,
            settings: Arc::new(settings),
        })
    }
}
