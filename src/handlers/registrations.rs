//! Registration and cancellation handlers
//!
//! Both answer with a 303 redirect to the parent event page on success.
//! A rejected registration answers 403 with the reason in the error body.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;
use crate::middleware::ApprovedUser;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub role: Option<String>,
}

pub fn event_page(event_id: i64) -> String {
    format!("/events/events/{event_id}")
}

pub async fn register(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(instance_id): Path<Uuid>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect> {
    state.rate_limiter.check_rate_limit(user.user_id, user.is_staff)?;

    // An omitted role falls back to the profile preference; with neither,
    // the empty code is rejected as an invalid role after the status checks.
    let role_code = match form.role.filter(|role| !role.trim().is_empty()) {
        Some(role) => role,
        None => state
            .services
            .user_service
            .preferred_role(user.user_id)
            .await?
            .map(|role| role.as_str().to_string())
            .unwrap_or_default(),
    };

    let decision = state
        .services
        .registration_service
        .register(user.user_id, instance_id, &role_code)
        .await?;

    Ok(Redirect::to(&event_page(decision.event_id)))
}

pub async fn cancel(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(instance_id): Path<Uuid>,
) -> Result<Redirect> {
    state.rate_limiter.check_rate_limit(user.user_id, user.is_staff)?;

    let outcome = state.services.registration_service.cancel(user.user_id, instance_id).await?;
    Ok(Redirect::to(&event_page(outcome.event_id)))
}
