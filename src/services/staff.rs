//! Staff administration service
//!
//! Create, update and delete operations for contacts, event types, events
//! and event instances. Every mutation is logged as a staff action.

use serde::Serialize;
use uuid::Uuid;
use crate::database::service::DatabaseService;
use crate::models::{
    Contact, CreateContactRequest, CreateEventRequest, CreateInstanceRequest, Event, EventInstance, EventType,
    InstanceFilter, Registration, RoleCounts, UpdateContactRequest, UpdateEventRequest, UpdateInstanceRequest,
};
use crate::services::auth::AuthContext;
use crate::utils::errors::{SwingRegistrationsError, Result};
use crate::utils::helpers::{clean_text, is_valid_email, Page, PageQuery};
use crate::utils::logging::log_staff_action;

const MAX_NAME_LENGTH: usize = 100;
const MAX_TITLE_LENGTH: usize = 200;

/// Instance as staff see it, with every registration
#[derive(Debug, Clone, Serialize)]
pub struct InstanceAdminView {
    #[serde(flatten)]
    pub instance: EventInstance,
    pub counts: RoleCounts,
    pub registrations: Vec<Registration>,
}

#[derive(Clone)]
pub struct StaffService {
    db: DatabaseService,
}

impl StaffService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    // Contacts

    pub async fn create_contact(&self, staff: &AuthContext, mut request: CreateContactRequest) -> Result<Contact> {
        request.first_name = required_text("first_name", &request.first_name, MAX_NAME_LENGTH)?;
        request.last_name = required_text("last_name", &request.last_name, MAX_NAME_LENGTH)?;
        request.email = optional_email(&request.email)?;
        request.phone = request.phone.trim().to_string();

        let contact = self.db.contacts.create(request).await?;
        log_staff_action(staff.user_id, "create_contact", Some(&contact.id.to_string()), None);
        Ok(contact)
    }

    pub async fn update_contact(&self, staff: &AuthContext, contact_id: i64, mut request: UpdateContactRequest) -> Result<Contact> {
        if let Some(first_name) = &request.first_name {
            request.first_name = Some(required_text("first_name", first_name, MAX_NAME_LENGTH)?);
        }
        if let Some(last_name) = &request.last_name {
            request.last_name = Some(required_text("last_name", last_name, MAX_NAME_LENGTH)?);
        }
        if let Some(email) = &request.email {
            request.email = Some(optional_email(email)?);
        }

        let contact = self
            .db
            .contacts
            .update(contact_id, request)
            .await?
            .ok_or(SwingRegistrationsError::ContactNotFound { contact_id })?;

        log_staff_action(staff.user_id, "update_contact", Some(&contact_id.to_string()), None);
        Ok(contact)
    }

    /// Refused with a conflict while an event references the contact
    pub async fn delete_contact(&self, staff: &AuthContext, contact_id: i64) -> Result<()> {
        if !self.db.contacts.delete(contact_id).await? {
            return Err(SwingRegistrationsError::ContactNotFound { contact_id });
        }

        log_staff_action(staff.user_id, "delete_contact", Some(&contact_id.to_string()), None);
        Ok(())
    }

    // Event types

    pub async fn list_event_types(&self) -> Result<Vec<EventType>> {
        self.db.event_types.list().await
    }

    pub async fn create_event_type(&self, staff: &AuthContext, name: &str) -> Result<EventType> {
        let name = required_text("name", name, MAX_NAME_LENGTH)?;
        let event_type = self.db.event_types.create(&name).await?;

        log_staff_action(staff.user_id, "create_event_type", Some(&event_type.id.to_string()), Some(&name));
        Ok(event_type)
    }

    pub async fn delete_event_type(&self, staff: &AuthContext, event_type_id: i64) -> Result<()> {
        if !self.db.event_types.delete(event_type_id).await? {
            return Err(SwingRegistrationsError::EventTypeNotFound { event_type_id });
        }

        log_staff_action(staff.user_id, "delete_event_type", Some(&event_type_id.to_string()), None);
        Ok(())
    }

    // Events

    pub async fn create_event(&self, staff: &AuthContext, mut request: CreateEventRequest) -> Result<Event> {
        request.title = required_text("title", &request.title, MAX_TITLE_LENGTH)?;
        validate_limits(Some(request.max_leaders), Some(request.max_followers), Some(request.max_participants))?;

        let event = self.db.events.create(request).await?;
        log_staff_action(staff.user_id, "create_event", Some(&event.id.to_string()), Some(&event.title));
        Ok(event)
    }

    pub async fn update_event(&self, staff: &AuthContext, event_id: i64, mut request: UpdateEventRequest) -> Result<Event> {
        if let Some(title) = &request.title {
            request.title = Some(required_text("title", title, MAX_TITLE_LENGTH)?);
        }
        validate_limits(request.max_leaders, request.max_followers, request.max_participants)?;

        let event = self
            .db
            .events
            .update(event_id, request)
            .await?
            .ok_or(SwingRegistrationsError::EventNotFound { event_id })?;

        log_staff_action(staff.user_id, "update_event", Some(&event_id.to_string()), None);
        Ok(event)
    }

    /// Deletes the event's registrations, instances and tag links with it
    pub async fn delete_event(&self, staff: &AuthContext, event_id: i64) -> Result<()> {
        if !self.db.events.delete(event_id).await? {
            return Err(SwingRegistrationsError::EventNotFound { event_id });
        }

        log_staff_action(staff.user_id, "delete_event", Some(&event_id.to_string()), None);
        Ok(())
    }

    // Instances

    pub async fn list_instances(&self, filter: &InstanceFilter, page: PageQuery) -> Result<Page<EventInstance>> {
        let instances = self.db.instances.list(filter, page.limit(), page.offset()).await?;
        let total = self.db.instances.count_filtered(filter).await?;
        Ok(Page::new(instances, page, total))
    }

    pub async fn get_instance(&self, instance_id: Uuid) -> Result<InstanceAdminView> {
        let instance = self
            .db
            .instances
            .find_by_id(instance_id)
            .await?
            .ok_or(SwingRegistrationsError::InstanceNotFound { instance_id })?;
        let counts = self.db.registrations.counts(instance_id).await?;
        let registrations = self.db.registrations.list_for_instance(instance_id).await?;

        Ok(InstanceAdminView {
            instance,
            counts,
            registrations,
        })
    }

    pub async fn create_instance(&self, staff: &AuthContext, request: CreateInstanceRequest) -> Result<EventInstance> {
        let event_id = request.event_id;
        if self.db.events.find_by_id(event_id).await?.is_none() {
            return Err(SwingRegistrationsError::EventNotFound { event_id });
        }

        let instance = self.db.instances.create(request).await?;
        log_staff_action(staff.user_id, "create_instance", Some(&instance.id.to_string()), None);
        Ok(instance)
    }

    pub async fn update_instance(&self, staff: &AuthContext, instance_id: Uuid, request: UpdateInstanceRequest) -> Result<EventInstance> {
        let instance = self
            .db
            .instances
            .update(instance_id, request)
            .await?
            .ok_or(SwingRegistrationsError::InstanceNotFound { instance_id })?;

        log_staff_action(
            staff.user_id,
            "update_instance",
            Some(&instance_id.to_string()),
            Some(instance.status.as_str()),
        );
        Ok(instance)
    }

    /// Deletes the instance's registrations with it
    pub async fn delete_instance(&self, staff: &AuthContext, instance_id: Uuid) -> Result<()> {
        if !self.db.instances.delete(instance_id).await? {
            return Err(SwingRegistrationsError::InstanceNotFound { instance_id });
        }

        log_staff_action(staff.user_id, "delete_instance", Some(&instance_id.to_string()), None);
        Ok(())
    }
}

/// Capacity limits must be non-negative; 0 is allowed
pub fn validate_limits(max_leaders: Option<i32>, max_followers: Option<i32>, max_participants: Option<i32>) -> Result<()> {
    let limits = [
        ("max_leaders", max_leaders),
        ("max_followers", max_followers),
        ("max_participants", max_participants),
    ];

    for (field, value) in limits {
        if let Some(value) = value {
            if value < 0 {
                return Err(SwingRegistrationsError::InvalidInput(format!("{field} must not be negative")));
            }
        }
    }

    Ok(())
}

fn required_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    match clean_text(value, max_len) {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(SwingRegistrationsError::InvalidInput(format!("{field} is required"))),
        None => Err(SwingRegistrationsError::InvalidInput(format!(
            "{field} must be at most {max_len} characters"
        ))),
    }
}

/// Blank is allowed; anything else must look like an address
fn optional_email(value: &str) -> Result<String> {
    let email = value.trim();
    if !email.is_empty() && !is_valid_email(email) {
        return Err(SwingRegistrationsError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(email.to_string())
}
