//! Error handling for Swing Registrations
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy, including the mapping of
//! every error onto an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Main error type for Swing Registrations
#[derive(Error, Debug)]
pub enum SwingRegistrationsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Registration rejected: {0}")]
    Rejected(#[from] RegistrationRejection),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Account {user_id} is awaiting staff approval")]
    NotApproved { user_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Event instance not found: {instance_id}")]
    InstanceNotFound { instance_id: Uuid },

    #[error("Contact not found: {contact_id}")]
    ContactNotFound { contact_id: i64 },

    #[error("Event type not found: {event_type_id}")]
    EventTypeNotFound { event_type_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a registration attempt is turned down.
///
/// These are expected, user-facing outcomes of the capacity rule. The
/// `Display` text is the reason string shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationRejection {
    /// Instance is canceled, pending or already past.
    #[error("registration not allowed for this instance")]
    InstanceNotRegistrable,

    #[error("invalid role")]
    InvalidRole,

    #[error("leader capacity reached")]
    LeaderCapacityReached,

    #[error("follower capacity reached")]
    FollowerCapacityReached,

    #[error("double-role not available")]
    DoubleRoleUnavailable,
}

impl RegistrationRejection {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationRejection::InstanceNotRegistrable => "INSTANCE_NOT_REGISTRABLE",
            RegistrationRejection::InvalidRole => "INVALID_ROLE",
            RegistrationRejection::LeaderCapacityReached => "LEADER_CAPACITY_REACHED",
            RegistrationRejection::FollowerCapacityReached => "FOLLOWER_CAPACITY_REACHED",
            RegistrationRejection::DoubleRoleUnavailable => "DOUBLE_ROLE_UNAVAILABLE",
        }
    }
}

/// Result type alias for Swing Registrations operations
pub type Result<T> = std::result::Result<T, SwingRegistrationsError>;

impl SwingRegistrationsError {
    /// Map a unique-constraint violation onto `Conflict`, keep anything else as is
    pub fn on_unique_violation(err: sqlx::Error, message: &str) -> Self {
        match sqlx_error_code(&err).as_deref() {
            Some(UNIQUE_VIOLATION) => SwingRegistrationsError::Conflict(message.to_string()),
            _ => SwingRegistrationsError::Database(err),
        }
    }

    /// Map a foreign-key violation onto `Conflict`, keep anything else as is
    pub fn on_foreign_key_violation(err: sqlx::Error, message: &str) -> Self {
        match sqlx_error_code(&err).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => SwingRegistrationsError::Conflict(message.to_string()),
            _ => SwingRegistrationsError::Database(err),
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SwingRegistrationsError::Database(_) => false,
            SwingRegistrationsError::Migration(_) => false,
            SwingRegistrationsError::Config(_) => false,
            SwingRegistrationsError::ConfigLoad(_) => false,
            SwingRegistrationsError::Token(_) => true,
            SwingRegistrationsError::PasswordHash(_) => false,
            SwingRegistrationsError::Rejected(_) => true,
            SwingRegistrationsError::PermissionDenied(_) => false,
            SwingRegistrationsError::Authentication(_) => true,
            SwingRegistrationsError::NotApproved { .. } => true,
            SwingRegistrationsError::UserNotFound { .. } => false,
            SwingRegistrationsError::EventNotFound { .. } => false,
            SwingRegistrationsError::InstanceNotFound { .. } => false,
            SwingRegistrationsError::ContactNotFound { .. } => false,
            SwingRegistrationsError::EventTypeNotFound { .. } => false,
            SwingRegistrationsError::Conflict(_) => true,
            SwingRegistrationsError::RateLimitExceeded => true,
            SwingRegistrationsError::InvalidInput(_) => true,
            SwingRegistrationsError::Serialization(_) => false,
            SwingRegistrationsError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SwingRegistrationsError::Database(_) => ErrorSeverity::Critical,
            SwingRegistrationsError::Migration(_) => ErrorSeverity::Critical,
            SwingRegistrationsError::Config(_) => ErrorSeverity::Critical,
            SwingRegistrationsError::ConfigLoad(_) => ErrorSeverity::Critical,
            SwingRegistrationsError::Rejected(_) => ErrorSeverity::Info,
            SwingRegistrationsError::InvalidInput(_) => ErrorSeverity::Info,
            SwingRegistrationsError::Conflict(_) => ErrorSeverity::Info,
            SwingRegistrationsError::NotApproved { .. } => ErrorSeverity::Info,
            SwingRegistrationsError::PermissionDenied(_) => ErrorSeverity::Warning,
            SwingRegistrationsError::Authentication(_) => ErrorSeverity::Warning,
            SwingRegistrationsError::Token(_) => ErrorSeverity::Warning,
            SwingRegistrationsError::RateLimitExceeded => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status used when the error reaches a handler boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            SwingRegistrationsError::Rejected(_) => StatusCode::FORBIDDEN,
            SwingRegistrationsError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            SwingRegistrationsError::NotApproved { .. } => StatusCode::FORBIDDEN,
            SwingRegistrationsError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SwingRegistrationsError::Token(_) => StatusCode::UNAUTHORIZED,
            SwingRegistrationsError::UserNotFound { .. }
            | SwingRegistrationsError::EventNotFound { .. }
            | SwingRegistrationsError::InstanceNotFound { .. }
            | SwingRegistrationsError::ContactNotFound { .. }
            | SwingRegistrationsError::EventTypeNotFound { .. } => StatusCode::NOT_FOUND,
            SwingRegistrationsError::Conflict(_) => StatusCode::CONFLICT,
            SwingRegistrationsError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SwingRegistrationsError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the JSON error body
    pub fn code(&self) -> &'static str {
        match self {
            SwingRegistrationsError::Rejected(rejection) => rejection.code(),
            SwingRegistrationsError::PermissionDenied(_) => "FORBIDDEN",
            SwingRegistrationsError::NotApproved { .. } => "NOT_APPROVED",
            SwingRegistrationsError::Authentication(_) | SwingRegistrationsError::Token(_) => "UNAUTHORIZED",
            SwingRegistrationsError::UserNotFound { .. }
            | SwingRegistrationsError::EventNotFound { .. }
            | SwingRegistrationsError::InstanceNotFound { .. }
            | SwingRegistrationsError::ContactNotFound { .. }
            | SwingRegistrationsError::EventTypeNotFound { .. } => "NOT_FOUND",
            SwingRegistrationsError::Conflict(_) => "CONFLICT",
            SwingRegistrationsError::InvalidInput(_) => "VALIDATION_ERROR",
            SwingRegistrationsError::RateLimitExceeded => "RATE_LIMITED",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show to the caller
    fn public_message(&self) -> String {
        match self {
            // Rejections carry the bare reason string.
            SwingRegistrationsError::Rejected(rejection) => rejection.to_string(),
            other if other.status_code().is_server_error() => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

fn sqlx_error_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for SwingRegistrationsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                severity = %self.severity(),
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
