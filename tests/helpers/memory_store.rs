//! In-memory registration store
//!
//! Implements the evaluator's storage interface over plain collections so
//! the capacity rules can be exercised without a database.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use swing_registrations::models::{InstanceCapacity, Registration, Role, RoleCounts};
use swing_registrations::services::RegistrationStore;
use swing_registrations::Result;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    instances: HashMap<Uuid, InstanceCapacity>,
    registrations: Vec<Registration>,
    next_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance and return its id
    pub fn add_instance(&mut self, instance: InstanceCapacity) -> Uuid {
        let id = instance.id;
        self.instances.insert(id, instance);
        id
    }

    /// Every stored registration for an instance
    pub fn registrations_for(&self, instance_id: Uuid) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| r.event_instance_id == instance_id)
            .collect()
    }

    pub fn counts(&self, instance_id: Uuid) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for registration in self.registrations_for(instance_id) {
            counts.increment(registration.role);
        }
        counts
    }

    pub fn role_of(&self, user_id: i64, instance_id: Uuid) -> Option<Role> {
        self.registrations
            .iter()
            .find(|r| r.user_id == user_id && r.event_instance_id == instance_id)
            .map(|r| r.role)
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    async fn load_instance(&mut self, instance_id: Uuid) -> Result<Option<InstanceCapacity>> {
        Ok(self.instances.get(&instance_id).cloned())
    }

    async fn role_counts(&mut self, instance_id: Uuid) -> Result<RoleCounts> {
        Ok(self.counts(instance_id))
    }

    async fn registration_exists(&mut self, user_id: i64, instance_id: Uuid) -> Result<bool> {
        Ok(self.role_of(user_id, instance_id).is_some())
    }

    async fn insert_registration(&mut self, user_id: i64, instance_id: Uuid, role: Role) -> Result<Registration> {
        self.next_id += 1;
        let registration = Registration {
            id: self.next_id,
            user_id,
            event_instance_id: instance_id,
            role,
            registered_at: Utc::now(),
        };
        self.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn delete_registration(&mut self, user_id: i64, instance_id: Uuid) -> Result<u64> {
        let before = self.registrations.len();
        self.registrations
            .retain(|r| !(r.user_id == user_id && r.event_instance_id == instance_id));
        Ok((before - self.registrations.len()) as u64)
    }
}
