//! Test helpers module
//!
//! Utilities shared by the integration tests: an in-memory registration
//! store, test data builders, and a PostgreSQL test database.

#![allow(dead_code)]

pub mod database_helper;
pub mod memory_store;
pub mod test_data;

#[allow(unused_imports)]
pub use database_helper::*;
#[allow(unused_imports)]
pub use memory_store::*;
#[allow(unused_imports)]
pub use test_data::*;
