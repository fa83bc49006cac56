//! Catalog handlers
//!
//! Public listings and detail pages, plus the caller's own registrations.

use axum::extract::{Path, Query, State};
use axum::Json;
use crate::database::repositories::UserRegistrationRow;
use crate::database::service::CatalogStats;
use crate::middleware::AuthUser;
use crate::models::Contact;
use crate::services::{ContactDetail, EventDetail, EventSummary};
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::{Page, PageQuery};

pub async fn index(State(state): State<AppState>) -> Result<Json<CatalogStats>> {
    let stats = state.services.catalog_service.index().await?;
    Ok(Json(stats))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<EventSummary>>> {
    let events = state.services.catalog_service.list_events(page).await?;
    Ok(Json(events))
}

pub async fn get_event(State(state): State<AppState>, Path(event_id): Path<i64>) -> Result<Json<EventDetail>> {
    let event = state.services.catalog_service.get_event(event_id).await?;
    Ok(Json(event))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Contact>>> {
    let contacts = state.services.catalog_service.list_contacts(page).await?;
    Ok(Json(contacts))
}

pub async fn get_contact(State(state): State<AppState>, Path(contact_id): Path<i64>) -> Result<Json<ContactDetail>> {
    let contact = state.services.catalog_service.get_contact(contact_id).await?;
    Ok(Json(contact))
}

pub async fn my_events(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<UserRegistrationRow>>> {
    let rows = state.services.catalog_service.my_events(user.user_id, page).await?;
    Ok(Json(rows))
}
