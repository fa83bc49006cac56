//! Catalog service
//!
//! Read side of the application: index totals, events with their instances
//! and live counts, contacts, and the caller's own registrations.

use serde::Serialize;
use tracing::debug;
use crate::database::repositories::UserRegistrationRow;
use crate::database::service::{CatalogStats, DatabaseService};
use crate::models::{Contact, Event, EventInstance, EventType, RoleCounts};
use crate::utils::errors::{SwingRegistrationsError, Result};
use crate::utils::helpers::{display_first_three, today, Page, PageQuery};

/// Event as shown in the listing
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    /// First three tag names joined with ", "
    pub display_type: String,
}

/// Instance with its live registration counts
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    #[serde(flatten)]
    pub instance: EventInstance,
    pub is_past: bool,
    pub counts: RoleCounts,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub event_types: Vec<EventType>,
    pub contact: Option<Contact>,
    pub instances: Vec<InstanceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactDetail {
    #[serde(flatten)]
    pub contact: Contact,
    /// "Last, First"
    pub display_name: String,
    pub events: Vec<Event>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseService,
}

impl CatalogService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Totals for the index page
    pub async fn index(&self) -> Result<CatalogStats> {
        self.db.get_catalog_stats().await
    }

    pub async fn list_events(&self, page: PageQuery) -> Result<Page<EventSummary>> {
        let events = self.db.events.list(page.limit(), page.offset()).await?;
        let total = self.db.events.count().await?;

        let mut items = Vec::with_capacity(events.len());
        for event in events {
            let types = self.db.events.event_types(event.id).await?;
            items.push(summarize(event, &types));
        }

        Ok(Page::new(items, page, total))
    }

    /// Event with its tags, contact and instances ordered by date
    pub async fn get_event(&self, event_id: i64) -> Result<EventDetail> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(SwingRegistrationsError::EventNotFound { event_id })?;

        let event_types = self.db.events.event_types(event_id).await?;
        let contact = match event.contact_id {
            Some(contact_id) => self.db.contacts.find_by_id(contact_id).await?,
            None => None,
        };

        let today = today();
        let mut instances = Vec::new();
        for instance in self.db.instances.list_for_event(event_id).await? {
            let counts = self.db.registrations.counts(instance.id).await?;
            instances.push(InstanceView {
                is_past: instance.is_past_on(today),
                total: counts.total(),
                counts,
                instance,
            });
        }

        debug!(event_id = event_id, instances = instances.len(), "Event detail loaded");

        Ok(EventDetail {
            summary: summarize(event, &event_types),
            event_types,
            contact,
            instances,
        })
    }

    pub async fn list_contacts(&self, page: PageQuery) -> Result<Page<Contact>> {
        let contacts = self.db.contacts.list(page.limit(), page.offset()).await?;
        let total = self.db.contacts.count().await?;
        Ok(Page::new(contacts, page, total))
    }

    pub async fn get_contact(&self, contact_id: i64) -> Result<ContactDetail> {
        let contact = self
            .db
            .contacts
            .find_by_id(contact_id)
            .await?
            .ok_or(SwingRegistrationsError::ContactNotFound { contact_id })?;
        let events = self.db.events.list_for_contact(contact_id).await?;

        Ok(ContactDetail {
            display_name: contact.to_string(),
            contact,
            events,
        })
    }

    /// Instances the user is registered for, status normal only
    pub async fn my_events(&self, user_id: i64, page: PageQuery) -> Result<Page<UserRegistrationRow>> {
        let rows = self
            .db
            .registrations
            .list_active_for_user(user_id, page.limit(), page.offset())
            .await?;
        let total = self.db.registrations.count_active_for_user(user_id).await?;
        Ok(Page::new(rows, page, total))
    }
}

fn summarize(event: Event, types: &[EventType]) -> EventSummary {
    EventSummary {
        display_type: display_first_three(types.iter().map(|t| t.name.as_str())),
        event,
    }
}
