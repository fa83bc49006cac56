//! Authentication service implementation
//!
//! Password hashing, access token issuance and verification, and the
//! permission model for staff and approved users.

use std::collections::HashSet;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::settings::AuthConfig;
use crate::models::{User, UserProfile};
use crate::utils::errors::{SwingRegistrationsError, Result};

/// Permission levels for different operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Any signed-in account
    User,
    /// Account approved by staff; may register for instances
    Approved,
    /// Staff account; may administer the catalog and users
    Staff,
}

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// User id carried in `sub`
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| SwingRegistrationsError::Authentication("Malformed token subject".to_string()))
    }
}

/// Issued access token
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Authentication context for a user
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub permissions: HashSet<Permission>,
    pub is_staff: bool,
    pub approved: bool,
}

impl AuthContext {
    /// Build the context from a user and their profile
    pub fn new(user: &User, profile: Option<&UserProfile>) -> Self {
        let approved = profile.map(|p| p.approved).unwrap_or(false);

        let mut permissions = HashSet::new();
        permissions.insert(Permission::User);
        if approved {
            permissions.insert(Permission::Approved);
        }
        if user.is_staff {
            permissions.insert(Permission::Staff);
        }

        Self {
            user_id: user.id,
            username: user.username.clone(),
            permissions,
            is_staff: user.is_staff,
            approved,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Require specific permission or return error
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.has_permission(permission) {
            return Ok(());
        }

        match permission {
            Permission::Approved => Err(SwingRegistrationsError::NotApproved { user_id: self.user_id }),
            _ => Err(SwingRegistrationsError::PermissionDenied(format!(
                "User {} lacks required permission: {:?}",
                self.user_id, permission
            ))),
        }
    }
}

/// Authentication service for passwords and access tokens
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Hash a password into an Argon2id PHC string
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SwingRegistrationsError::PasswordHash(e.to_string()))
    }

    /// Check a password against a stored PHC string
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| SwingRegistrationsError::PasswordHash(format!("invalid hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(SwingRegistrationsError::PasswordHash(e.to_string())),
        }
    }

    /// Issue a signed HS256 access token for `user_id`
    pub fn issue_token(&self, user_id: i64) -> Result<AccessToken> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.config.token_ttl_seconds as i64,
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)?;

        debug!(user_id = user_id, expires_at = claims.exp, "Access token issued");

        Ok(AccessToken {
            access_token,
            token_type: "Bearer",
            expires_in: self.config.token_ttl_seconds,
        })
    }

    /// Verify signature and expiry of an access token
    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        let key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);

        jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    SwingRegistrationsError::Authentication("Token expired".to_string())
                }
                _ => SwingRegistrationsError::Authentication("Invalid token".to_string()),
            })
    }

    /// Log authentication event
    pub fn log_auth_event(&self, user_id: Option<i64>, action: &str, success: bool, details: Option<&str>) {
        if success {
            info!(
                user_id = user_id,
                action = action,
                details = details,
                "Authentication event: success"
            );
        } else {
            warn!(
                user_id = user_id,
                action = action,
                details = details,
                "Authentication event: failure"
            );
        }
    }
}
