//! Database service layer
//!
//! This module provides a high-level interface to database operations

use serde::Serialize;
use crate::database::{
    DatabasePool, ContactRepository, EventRepository, EventTypeRepository, InstanceRepository,
    RegistrationRepository, UserRepository,
};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub contacts: ContactRepository,
    pub event_types: EventTypeRepository,
    pub events: EventRepository,
    pub instances: InstanceRepository,
    pub registrations: RegistrationRepository,
}

/// Catalog totals shown on the index page
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogStats {
    pub events: i64,
    pub instances: i64,
    pub instances_available: i64,
    pub contacts: i64,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            contacts: ContactRepository::new(pool.clone()),
            event_types: EventTypeRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            instances: InstanceRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool),
        }
    }

    /// Get catalog statistics
    pub async fn get_catalog_stats(&self) -> Result<CatalogStats> {
        let (events, instances, instances_available, contacts) = tokio::try_join!(
            self.events.count(),
            self.instances.count(),
            self.instances.count_available(),
            self.contacts.count(),
        )?;

        Ok(CatalogStats {
            events,
            instances,
            instances_available,
            contacts,
        })
    }
}
