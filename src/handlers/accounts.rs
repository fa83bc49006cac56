//! Account handlers: sign-up, login and the caller's profile

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use crate::middleware::AuthUser;
use crate::models::{LogInRequest, SignUpRequest, UpdateProfileRequest, User, UserProfile};
use crate::services::AccessToken;
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: User,
    pub profile: UserProfile,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let (user, profile) = state.services.user_service.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse { user, profile })))
}

pub async fn log_in(State(state): State<AppState>, Json(request): Json<LogInRequest>) -> Result<Json<AccessToken>> {
    let token = state.services.user_service.log_in(request).await?;
    Ok(Json(token))
}

pub async fn get_profile(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<UserProfile>> {
    let profile = state.services.user_service.get_profile(user.user_id).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let profile = state.services.user_service.update_profile(user.user_id, request).await?;
    Ok(Json(profile))
}
