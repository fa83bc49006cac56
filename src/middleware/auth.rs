//! Authentication middleware
//!
//! Axum extractors resolving the `Authorization: Bearer <token>` header into
//! an authenticated user, an approved user, or a staff user.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;
use crate::middleware::logging::log_security_event;
use crate::services::auth::{AuthContext, Permission};
use crate::state::AppState;
use crate::utils::errors::SwingRegistrationsError;

/// Raw bearer token from the `Authorization` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = SwingRegistrationsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| SwingRegistrationsError::Authentication("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SwingRegistrationsError::Authentication("Expected 'Bearer <token>' authorization".to_string())
            })?;

        Ok(Self(token.to_string()))
    }
}

/// Any signed-in user
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = SwingRegistrationsError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        match state.services.user_service.authenticate(&token).await {
            Ok(context) => {
                debug!(user_id = context.user_id, "Request authenticated");
                Ok(Self(context))
            }
            Err(e) => {
                log_security_event("invalid_token", None, &e.to_string());
                Err(e)
            }
        }
    }
}

/// Signed-in user whose account staff have approved
#[derive(Debug, Clone)]
pub struct ApprovedUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for ApprovedUser {
    type Rejection = SwingRegistrationsError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(context) = AuthUser::from_request_parts(parts, state).await?;
        context.require(Permission::Approved)?;
        Ok(Self(context))
    }
}

/// Staff user
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = SwingRegistrationsError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(context) = AuthUser::from_request_parts(parts, state).await?;

        if let Err(e) = context.require(Permission::Staff) {
            log_security_event("staff_access_denied", Some(context.user_id), parts.uri.path());
            return Err(e);
        }

        Ok(Self(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::Request;

    async fn bearer(header: Option<&str>) -> Result<BearerToken, SwingRegistrationsError> {
        let mut builder = Request::builder().uri("/events/myevents/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_bearer_token_extraction() {
        let token = bearer(Some("Bearer abc.def.ghi")).await.unwrap();
        assert_eq!(token.0, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header() {
        assert_matches!(bearer(None).await, Err(SwingRegistrationsError::Authentication(_)));
        assert_matches!(bearer(Some("Basic dXNlcjpwYXNz")).await, Err(SwingRegistrationsError::Authentication(_)));
        assert_matches!(bearer(Some("Bearer   ")).await, Err(SwingRegistrationsError::Authentication(_)));
    }
}
