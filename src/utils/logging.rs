//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the registration service.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::utils::errors::{RegistrationRejection, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "swing-registrations.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(config.json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout)))
        .with((!config.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout)))
        .with(file_writer.map(|writer| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)))
        .try_init()
        .map_err(|e| crate::utils::errors::SwingRegistrationsError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Outcome label used in registration decision logs
#[derive(Debug, Clone, Copy)]
pub enum DecisionOutcome {
    Registered,
    AlreadyRegistered,
    Rejected(RegistrationRejection),
}

/// Log the result of a registration attempt with structured data
pub fn log_registration_decision(user_id: i64, instance_id: Uuid, role: &str, outcome: DecisionOutcome) {
    match outcome {
        DecisionOutcome::Registered => info!(
            user_id = user_id,
            instance_id = %instance_id,
            role = role,
            "Registration accepted"
        ),
        DecisionOutcome::AlreadyRegistered => debug!(
            user_id = user_id,
            instance_id = %instance_id,
            role = role,
            "Registration already present, nothing to do"
        ),
        DecisionOutcome::Rejected(reason) => info!(
            user_id = user_id,
            instance_id = %instance_id,
            role = role,
            reason = %reason,
            "Registration rejected"
        ),
    }
}

/// Log a cancellation
pub fn log_cancellation(user_id: i64, instance_id: Uuid, removed: bool) {
    info!(
        user_id = user_id,
        instance_id = %instance_id,
        removed = removed,
        "Registration cancelled"
    );
}

/// Log staff actions
pub fn log_staff_action(staff_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        staff_id = staff_id,
        action = action,
        target = target,
        details = details,
        "Staff action performed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
