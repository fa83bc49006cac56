//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{SwingRegistrationsError, Result};
use super::Settings;

/// Shortest accepted HMAC secret, in bytes
const MIN_JWT_SECRET_LEN: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(SwingRegistrationsError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(SwingRegistrationsError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SwingRegistrationsError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SwingRegistrationsError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SwingRegistrationsError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(SwingRegistrationsError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(SwingRegistrationsError::Config(
            "JWT secret is required".to_string()
        ));
    }

    if config.jwt_secret.len() < MIN_JWT_SECRET_LEN {
        return Err(SwingRegistrationsError::Config(
            format!("JWT secret must be at least {} bytes", MIN_JWT_SECRET_LEN)
        ));
    }

    if config.token_ttl_seconds == 0 {
        return Err(SwingRegistrationsError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(SwingRegistrationsError::Config(
            "Rate limit must allow at least one request per minute".to_string()
        ));
    }

    if config.burst == 0 {
        return Err(SwingRegistrationsError::Config(
            "Rate limit burst must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(SwingRegistrationsError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SwingRegistrationsError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if let Some(path) = &config.file_path {
        if path.is_empty() {
            return Err(SwingRegistrationsError::Config(
                "Log file path cannot be empty when set".to_string()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_is_rejected() {
        let settings = Settings::default();
        assert_matches!(validate_settings(&settings), Err(SwingRegistrationsError::Config(_)));
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = "short".to_string();
        assert_matches!(validate_settings(&settings), Err(SwingRegistrationsError::Config(msg)) if msg.contains("at least"));
    }

    #[test]
    fn test_pool_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());

        settings.database.min_connections = 1;
        settings.database.max_connections = 0;
        assert!(validate_settings(&settings).is_err());

        let mut settings = valid_settings();
        settings.database.acquire_timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rate_limit_must_be_positive() {
        let mut settings = valid_settings();
        settings.rate_limit.requests_per_minute = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
