//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod catalog;
pub mod registration;
pub mod staff;
pub mod user;

// Re-export commonly used services
pub use auth::{AccessToken, AuthContext, AuthService, Claims, Permission};
pub use catalog::{CatalogService, ContactDetail, EventDetail, EventSummary, InstanceView};
pub use registration::{
    CancellationOutcome, RegistrationDecision, RegistrationOutcome, RegistrationService, RegistrationStore,
};
pub use staff::{InstanceAdminView, StaffService};
pub use user::UserService;

use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::{health_check, DatabasePool, DatabaseService};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub registration_service: RegistrationService,
    pub staff_service: StaffService,
    pool: DatabasePool,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, pool: DatabasePool) -> Self {
        let database = DatabaseService::new(pool.clone());
        let auth_service = AuthService::new(settings.auth.clone());
        let user_service = UserService::new(database.users.clone(), auth_service.clone(), settings);
        let catalog_service = CatalogService::new(database.clone());
        let registration_service = RegistrationService::new(database.registrations.clone());
        let staff_service = StaffService::new(database);

        Self {
            auth_service,
            user_service,
            catalog_service,
            registration_service,
            staff_service,
            pool,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        ServiceHealthStatus {
            database_healthy: health_check(&self.pool).await.is_ok(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }

        issues
    }
}
