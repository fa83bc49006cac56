//! Database module
//!
//! This module handles database connections and operations

pub mod connection;
pub mod repositories;
pub mod service;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, pool_options, run_migrations, DatabasePool};
pub use repositories::{
    ContactRepository, EventRepository, EventTypeRepository, InstanceRepository, RegistrationRepository,
    UserRepository,
};
pub use service::DatabaseService;
