//! User and user profile models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::models::registration::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-to-one companion of a user holding the approval gate
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub role_preference: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Stored preference as a role, if it is set and recognized
    pub fn preferred_role(&self) -> Option<Role> {
        self.role_preference.as_deref().and_then(Role::parse)
    }
}

/// User joined with their profile, as listed to staff
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserWithProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub role_preference: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub role_preference: Option<Role>,
    pub approved: bool,
}

/// Account sign-up form
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_preference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogInRequest {
    pub username: String,
    pub password: String,
}

/// Profile update; an empty or missing preference clears it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub role_preference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_role() {
        let mut profile = UserProfile {
            user_id: 1,
            role_preference: Some("follower".to_string()),
            approved: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(profile.preferred_role(), Some(Role::Follower));

        profile.role_preference = None;
        assert_eq!(profile.preferred_role(), None);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "dancer".to_string(),
            email: "dancer@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_staff: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
