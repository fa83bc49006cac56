//! Health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use crate::services::ServiceHealthStatus;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(flatten)]
    pub services: ServiceHealthStatus,
    pub issues: Vec<String>,
}

/// Liveness; does not touch the database
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// Readiness; 503 while the database is unreachable
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let services = state.services.health_check().await;
    let ready = services.is_healthy();
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(ReadinessResponse {
            ready,
            issues: services.get_issues(),
            services,
        }),
    )
}
