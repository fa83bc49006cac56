//! Event, event type and event instance models

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Tag describing what kind of event this is
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub contact_id: Option<i64>,
    pub summary: String,
    pub max_leaders: i32,
    pub max_followers: i32,
    pub max_participants: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn capacity(&self) -> CapacityLimits {
        CapacityLimits {
            max_leaders: self.max_leaders,
            max_followers: self.max_followers,
            max_participants: self.max_participants,
        }
    }
}

/// Per-instance caps configured on an event. Zero disables the leader and
/// follower caps; see [`CapacityLimits::offers_double_role`] for the total cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimits {
    pub max_leaders: i32,
    pub max_followers: i32,
    pub max_participants: i32,
}

impl CapacityLimits {
    pub fn new(max_leaders: i32, max_followers: i32, max_participants: i32) -> Self {
        Self {
            max_leaders,
            max_followers,
            max_participants,
        }
    }

    /// Double-role slots exist only when the total cap leaves room above the
    /// dedicated leader and follower pools.
    pub fn offers_double_role(&self) -> bool {
        let dedicated = i64::from(self.max_leaders) + i64::from(self.max_followers);
        self.max_participants != 0 && i64::from(self.max_participants) > dedicated
    }
}

/// Lifecycle state of a single dated occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    #[default]
    Normal,
    Canceled,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instance status: {0:?}")]
pub struct UnknownStatus(pub String);

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Normal => "normal",
            InstanceStatus::Canceled => "canceled",
            InstanceStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(InstanceStatus::Normal),
            "canceled" => Ok(InstanceStatus::Canceled),
            "pending" => Ok(InstanceStatus::Pending),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for InstanceStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventInstance {
    pub id: Uuid,
    pub event_id: i64,
    pub description: String,
    pub date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: InstanceStatus,
}

impl EventInstance {
    /// Dated and strictly before `today`
    pub fn is_past_on(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|date| date < today)
    }
}

/// An instance together with the capacity limits of its event, as the
/// registration rule needs it
#[derive(Debug, Clone, FromRow)]
pub struct InstanceCapacity {
    pub id: Uuid,
    pub event_id: i64,
    pub date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: InstanceStatus,
    pub max_leaders: i32,
    pub max_followers: i32,
    pub max_participants: i32,
}

impl InstanceCapacity {
    pub fn limits(&self) -> CapacityLimits {
        CapacityLimits::new(self.max_leaders, self.max_followers, self.max_participants)
    }

    /// Normal status and not past
    pub fn accepts_registrations_on(&self, today: NaiveDate) -> bool {
        self.status == InstanceStatus::Normal && !self.date.is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub contact_id: Option<i64>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub event_type_ids: Vec<i64>,
    #[serde(default)]
    pub max_leaders: i32,
    #[serde(default)]
    pub max_followers: i32,
    #[serde(default)]
    pub max_participants: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub contact_id: Option<i64>,
    pub summary: Option<String>,
    /// Replaces the tag set when present
    pub event_type_ids: Option<Vec<i64>>,
    pub max_leaders: Option<i32>,
    pub max_followers: Option<i32>,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstanceRequest {
    pub event_id: i64,
    #[serde(default)]
    pub description: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InstanceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInstanceRequest {
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<InstanceStatus>,
}

/// Staff listing filter for instances
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceFilter {
    pub status: Option<InstanceStatus>,
    pub date: Option<NaiveDate>,
}
