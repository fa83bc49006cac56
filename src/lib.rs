//! Swing Registrations
//!
//! Event registration service for a swing dance community. Staff publish
//! events with dated instances and capacity limits; approved members
//! register as leader, follower or double role, and the capacity evaluator
//! decides whether each registration fits.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{SwingRegistrationsError, RegistrationRejection, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::build_router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
