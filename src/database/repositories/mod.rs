//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod contact;
pub mod event;
pub mod event_type;
pub mod instance;
pub mod registration;
pub mod user;

// Re-export repositories
pub use contact::ContactRepository;
pub use event::EventRepository;
pub use event_type::EventTypeRepository;
pub use instance::InstanceRepository;
pub use registration::{PgRegistrationStore, RegistrationRepository, UserRegistrationRow};
pub use user::UserRepository;
