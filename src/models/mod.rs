//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod contact;
pub mod event;
pub mod registration;
pub mod user;

// Re-export commonly used models
pub use contact::{Contact, CreateContactRequest, UpdateContactRequest};
pub use event::{
    CapacityLimits, CreateEventRequest, CreateInstanceRequest, Event, EventInstance, EventType,
    InstanceCapacity, InstanceFilter, InstanceStatus, UpdateEventRequest, UpdateInstanceRequest,
};
pub use registration::{Registration, Role, RoleCounts};
pub use user::{
    CreateUserRequest, LogInRequest, SignUpRequest, UpdateProfileRequest, User, UserProfile, UserWithProfile,
};
