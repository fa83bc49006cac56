//! Registration model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Capacity pool a registration draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    Follower,
    DoubleRole,
}

/// Unrecognized role code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role code: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Leader, Role::Follower, Role::DoubleRole];

    /// Stored code
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Leader => "leader",
            Role::Follower => "follower",
            Role::DoubleRole => "double_role",
        }
    }

    /// Parse a submitted role code; surrounding whitespace and case are ignored
    pub fn parse(code: &str) -> Option<Role> {
        let code = code.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub event_instance_id: Uuid,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub registered_at: DateTime<Utc>,
}

/// Live registration counts for one instance, always derived by counting rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub leaders: i64,
    pub followers: i64,
    pub double_roles: i64,
}

impl RoleCounts {
    /// Every registration regardless of role
    pub fn total(&self) -> i64 {
        self.leaders + self.followers + self.double_roles
    }

    /// Count for one role
    pub fn for_role(&self, role: Role) -> i64 {
        match role {
            Role::Leader => self.leaders,
            Role::Follower => self.followers,
            Role::DoubleRole => self.double_roles,
        }
    }

    /// Count one more registration in `role`
    pub fn increment(&mut self, role: Role) {
        match role {
            Role::Leader => self.leaders += 1,
            Role::Follower => self.followers += 1,
            Role::DoubleRole => self.double_roles += 1,
        }
    }
}
