//! Test data builders
//!
//! Builders for instances, events and accounts. Free-text values come from
//! `fake` so tests do not depend on particular names.

use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{Duration, NaiveDate};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use uuid::Uuid;
use swing_registrations::models::{
    CreateContactRequest, CreateEventRequest, CreateInstanceRequest, InstanceCapacity, InstanceStatus, SignUpRequest,
};
use swing_registrations::utils::helpers::today;

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

pub fn tomorrow() -> NaiveDate {
    today() + Duration::days(1)
}

pub fn yesterday() -> NaiveDate {
    today() - Duration::days(1)
}

/// Builder for the instance-with-limits view the evaluator reads
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    instance: InstanceCapacity,
}

impl InstanceBuilder {
    /// Normal, dated tomorrow, no limits
    pub fn new() -> Self {
        Self {
            instance: InstanceCapacity {
                id: Uuid::new_v4(),
                event_id: next_sequence() as i64,
                date: Some(tomorrow()),
                status: InstanceStatus::Normal,
                max_leaders: 0,
                max_followers: 0,
                max_participants: 0,
            },
        }
    }

    pub fn limits(mut self, max_leaders: i32, max_followers: i32, max_participants: i32) -> Self {
        self.instance.max_leaders = max_leaders;
        self.instance.max_followers = max_followers;
        self.instance.max_participants = max_participants;
        self
    }

    pub fn status(mut self, status: InstanceStatus) -> Self {
        self.instance.status = status;
        self
    }

    pub fn date(mut self, date: Option<NaiveDate>) -> Self {
        self.instance.date = date;
        self
    }

    pub fn build(self) -> InstanceCapacity {
        self.instance
    }
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique username matching the sign-up rules
pub fn unique_username() -> String {
    let first: String = FirstName().fake();
    let mut base: String = first.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if base.len() < 3 {
        base = "dancer".to_string();
    }
    format!("{}_{}", base.to_lowercase(), next_sequence())
}

pub fn sign_up_request(role_preference: Option<&str>) -> SignUpRequest {
    SignUpRequest {
        username: unique_username(),
        email: SafeEmail().fake(),
        password: "correct-horse-battery".to_string(),
        role_preference: role_preference.map(str::to_string),
    }
}

pub fn contact_request() -> CreateContactRequest {
    CreateContactRequest {
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        phone: String::new(),
        email: SafeEmail().fake(),
    }
}

pub fn event_request(max_leaders: i32, max_followers: i32, max_participants: i32) -> CreateEventRequest {
    CreateEventRequest {
        title: format!("Social dance {}", next_sequence()),
        contact_id: None,
        summary: Sentence(3..8).fake(),
        event_type_ids: Vec::new(),
        max_leaders,
        max_followers,
        max_participants,
    }
}

pub fn instance_request(event_id: i64, date: Option<NaiveDate>) -> CreateInstanceRequest {
    CreateInstanceRequest {
        event_id,
        description: Sentence(2..5).fake(),
        date,
        status: InstanceStatus::Normal,
    }
}
