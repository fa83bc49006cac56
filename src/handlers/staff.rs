//! Staff handlers
//!
//! User approval and catalog administration. Every route requires a staff
//! token.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use crate::middleware::StaffUser;
use crate::models::{
    Contact, CreateContactRequest, CreateEventRequest, CreateInstanceRequest, Event, EventInstance, EventType,
    InstanceFilter, InstanceStatus, UpdateContactRequest, UpdateEventRequest, UpdateInstanceRequest, UserProfile,
    UserWithProfile,
};
use crate::services::InstanceAdminView;
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::{Page, PageQuery};

#[derive(Debug, Deserialize)]
pub struct CreateEventTypeRequest {
    pub name: String,
}

/// Instance listing query: `?status=&date=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct InstanceListQuery {
    pub status: Option<InstanceStatus>,
    pub date: Option<NaiveDate>,
    pub page: Option<u32>,
}

impl InstanceListQuery {
    fn split(self) -> (InstanceFilter, PageQuery) {
        (
            InstanceFilter {
                status: self.status,
                date: self.date,
            },
            PageQuery { page: self.page },
        )
    }
}

// Users

pub async fn list_unapproved(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<UserWithProfile>>> {
    let users = state.services.user_service.list_unapproved(page).await?;
    Ok(Json(users))
}

pub async fn approve_user(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>> {
    let profile = state.services.user_service.approve(&staff, user_id).await?;
    Ok(Json(profile))
}

pub async fn delete_user(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(user_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.user_service.delete_user(&staff, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Contacts

pub async fn create_contact(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = state.services.staff_service.create_contact(&staff, request).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(contact_id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<Contact>> {
    let contact = state.services.staff_service.update_contact(&staff, contact_id, request).await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(contact_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.staff_service.delete_contact(&staff, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Event types

pub async fn list_event_types(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
) -> Result<Json<Vec<EventType>>> {
    let types = state.services.staff_service.list_event_types().await?;
    Ok(Json(types))
}

pub async fn create_event_type(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(request): Json<CreateEventTypeRequest>,
) -> Result<(StatusCode, Json<EventType>)> {
    let event_type = state.services.staff_service.create_event_type(&staff, &request.name).await?;
    Ok((StatusCode::CREATED, Json(event_type)))
}

pub async fn delete_event_type(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(event_type_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.staff_service.delete_event_type(&staff, event_type_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Events

pub async fn create_event(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.staff_service.create_event(&staff, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(event_id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let event = state.services.staff_service.update_event(&staff, event_id, request).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(event_id): Path<i64>,
) -> Result<StatusCode> {
    state.services.staff_service.delete_event(&staff, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Instances

pub async fn list_instances(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Query(query): Query<InstanceListQuery>,
) -> Result<Json<Page<EventInstance>>> {
    let (filter, page) = query.split();
    let instances = state.services.staff_service.list_instances(&filter, page).await?;
    Ok(Json(instances))
}

pub async fn get_instance(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
    Path(instance_id): Path<Uuid>,
) -> Result<Json<InstanceAdminView>> {
    let instance = state.services.staff_service.get_instance(instance_id).await?;
    Ok(Json(instance))
}

pub async fn create_instance(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(request): Json<CreateInstanceRequest>,
) -> Result<(StatusCode, Json<EventInstance>)> {
    let instance = state.services.staff_service.create_instance(&staff, request).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

pub async fn update_instance(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(instance_id): Path<Uuid>,
    Json(request): Json<UpdateInstanceRequest>,
) -> Result<Json<EventInstance>> {
    let instance = state.services.staff_service.update_instance(&staff, instance_id, request).await?;
    Ok(Json(instance))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(instance_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.services.staff_service.delete_instance(&staff, instance_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
