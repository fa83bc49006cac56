//! HTTP handlers module
//!
//! axum handlers grouped by area:
//! - Catalog listings and detail pages
//! - Registration and cancellation
//! - Accounts and profiles
//! - Staff administration

pub mod accounts;
pub mod catalog;
pub mod health;
pub mod registrations;
pub mod routes;
pub mod staff;

pub use routes::build_router;
