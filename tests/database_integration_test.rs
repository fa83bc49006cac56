//! PostgreSQL integration tests
//!
//! Each test gets a migrated database from `TestDatabase` and is skipped
//! when no database can be provisioned.

mod helpers;

use std::time::Duration;
use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use helpers::*;
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;
use swing_registrations::database::{RegistrationRepository, UserRepository};
use swing_registrations::models::{InstanceStatus, Role, UpdateInstanceRequest};
use swing_registrations::services::{RegistrationOutcome, RegistrationService, RegistrationStore};
use swing_registrations::utils::errors::{RegistrationRejection, SwingRegistrationsError};
use swing_registrations::build_router;

macro_rules! test_database {
    () => {
        match TestDatabase::try_new().await {
            Some(db) => db,
            None => return,
        }
    };
}

fn register_request(instance_id: Uuid, token: &str, role: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/events/eventinstances/{instance_id}/register/"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("role={role}")))
        .unwrap()
}

fn authorized(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[serial]
async fn test_concurrent_last_slot_admits_exactly_one() {
    let db = test_database!();
    let event = db.create_event(1, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;

    let mut users = Vec::new();
    for _ in 0..6 {
        users.push(db.create_user(true).await);
    }

    let service = RegistrationService::new(RegistrationRepository::new(db.pool.clone()));
    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let service = service.clone();
            let user_id = user.id;
            tokio::spawn(async move { service.register(user_id, instance.id, "leader").await })
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(decision) => {
                assert_matches!(decision.outcome, RegistrationOutcome::Registered { .. });
                admitted += 1;
            }
            Err(SwingRegistrationsError::Rejected(RegistrationRejection::LeaderCapacityReached)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(rejected, 5);
    assert_eq!(db.registrations_for(instance.id).await, 1);
}

#[tokio::test]
#[serial]
async fn test_duplicate_registration_is_not_stored_twice() {
    let db = test_database!();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, None).await;
    let user = db.create_user(true).await;

    let service = RegistrationService::new(RegistrationRepository::new(db.pool.clone()));
    let first = service.register(user.id, instance.id, "follower").await.unwrap();
    let second = service.register(user.id, instance.id, "leader").await.unwrap();

    assert_eq!(first.event_id, event.id);
    assert_matches!(second.outcome, RegistrationOutcome::AlreadyRegistered);
    assert_eq!(db.registrations_for(instance.id).await, 1);

    assert!(service.cancel(user.id, instance.id).await.unwrap().removed);
    assert!(!service.cancel(user.id, instance.id).await.unwrap().removed);
}

#[tokio::test]
#[serial]
async fn test_status_change_blocks_new_registrations() {
    let db = test_database!();
    let service = db.service();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;
    let user = db.create_user(true).await;

    service
        .instances
        .update(instance.id, UpdateInstanceRequest { status: Some(InstanceStatus::Canceled), ..Default::default() })
        .await
        .unwrap();

    let registrations = RegistrationService::new(service.registrations.clone());
    assert_matches!(
        registrations.register(user.id, instance.id, "leader").await,
        Err(SwingRegistrationsError::Rejected(RegistrationRejection::InstanceNotRegistrable))
    );
}

#[tokio::test]
#[serial]
async fn test_event_delete_cascades() {
    let db = test_database!();
    let service = db.service();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;
    let user = db.create_user(true).await;

    RegistrationService::new(service.registrations.clone())
        .register(user.id, instance.id, "leader")
        .await
        .unwrap();

    assert!(service.events.delete(event.id).await.unwrap());
    assert_eq!(db.count_records("event_instances").await, 0);
    assert_eq!(db.count_records("registrations").await, 0);
    assert_eq!(db.count_records("users").await, 1);
}

#[tokio::test]
#[serial]
async fn test_user_delete_cascades() {
    let db = test_database!();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, None).await;
    let user = db.create_user(true).await;

    RegistrationService::new(RegistrationRepository::new(db.pool.clone()))
        .register(user.id, instance.id, "leader")
        .await
        .unwrap();
    let users = UserRepository::new(db.pool.clone());

    assert!(users.delete(user.id).await.unwrap());
    assert!(users.find_profile(user.id).await.unwrap().is_none());
    assert_eq!(db.count_records("registrations").await, 0);
    assert_eq!(db.count_records("event_instances").await, 1);
}

#[tokio::test]
#[serial]
async fn test_contact_in_use_cannot_be_deleted() {
    let db = test_database!();
    let service = db.service();
    let contact = service.contacts.create(contact_request()).await.unwrap();

    let mut request = event_request(0, 0, 0);
    request.contact_id = Some(contact.id);
    let event = service.events.create(request).await.unwrap();

    assert_matches!(service.contacts.delete(contact.id).await, Err(SwingRegistrationsError::Conflict(_)));

    service.events.delete(event.id).await.unwrap();
    assert!(service.contacts.delete(contact.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_event_type_names_are_unique_ignoring_case() {
    let db = test_database!();
    let service = db.service();

    service.event_types.create("Lindy Hop").await.unwrap();
    assert_matches!(
        service.event_types.create("lindy hop").await,
        Err(SwingRegistrationsError::Conflict(_))
    );
    assert!(service.event_types.create("Balboa").await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_http_registration_requires_approval() {
    let db = test_database!();
    let state = db.app_state(Vec::new());
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;

    let pending = db.create_user(false).await;
    let approved = db.create_user(true).await;
    let pending_token = state.services.auth_service.issue_token(pending.id).unwrap().access_token;
    let approved_token = state.services.auth_service.issue_token(approved.id).unwrap().access_token;

    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(register_request(instance.id, &pending_token, "leader"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "NOT_APPROVED");

    let response = app
        .oneshot(register_request(instance.id, &approved_token, "leader"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/events/events/{}", event.id).as_str()
    );
    assert_eq!(db.registrations_for(instance.id).await, 1);
}

#[tokio::test]
#[serial]
async fn test_http_rejection_carries_reason() {
    let db = test_database!();
    let state = db.app_state(Vec::new());
    let event = db.create_event(1, 1, 2).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;
    let user = db.create_user(true).await;
    let token = state.services.auth_service.issue_token(user.id).unwrap().access_token;

    let response = build_router(state)
        .oneshot(register_request(instance.id, &token, "double_role"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "DOUBLE_ROLE_UNAVAILABLE");
    assert_eq!(body["message"], "double-role not available");
    assert_eq!(db.registrations_for(instance.id).await, 0);
}

#[tokio::test]
#[serial]
async fn test_sign_up_and_log_in_round_trip() {
    let db = test_database!();
    let state = db.app_state(Vec::new());
    let request = sign_up_request(Some("follower"));
    let (username, password) = (request.username.clone(), request.password.clone());

    let body = serde_json::json!({
        "username": request.username,
        "email": request.email,
        "password": request.password,
        "role_preference": "follower",
    });
    let response = build_router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events/accounts/register/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = json_body(response).await;
    assert_eq!(account["profile"]["approved"], false);

    let login = serde_json::json!({ "username": username, "password": password });
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events/accounts/login/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(login.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["access_token"].is_string());
}

#[tokio::test]
#[serial]
async fn test_event_delete_waits_for_registration_in_flight() {
    let db = test_database!();
    let service = db.service();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;
    let user = db.create_user(true).await;

    // Registration holds the instance lock and has inserted, not committed
    let mut store = service.registrations.begin().await.unwrap();
    store.load_instance(instance.id).await.unwrap();
    store.insert_registration(user.id, instance.id, Role::Leader).await.unwrap();

    let events = service.events.clone();
    let delete = tokio::spawn(async move { events.delete(event.id).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!delete.is_finished());

    store.commit().await.unwrap();

    assert!(delete.await.unwrap().unwrap());
    assert_eq!(db.count_records("registrations").await, 0);
    assert_eq!(db.count_records("event_instances").await, 0);
}

#[tokio::test]
#[serial]
async fn test_instance_delete_waits_for_registration_in_flight() {
    let db = test_database!();
    let service = db.service();
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;
    let user = db.create_user(true).await;

    let mut store = service.registrations.begin().await.unwrap();
    store.load_instance(instance.id).await.unwrap();
    store.insert_registration(user.id, instance.id, Role::Follower).await.unwrap();

    let instances = service.instances.clone();
    let delete = tokio::spawn(async move { instances.delete(instance.id).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    store.commit().await.unwrap();

    assert!(delete.await.unwrap().unwrap());
    assert_eq!(db.registrations_for(instance.id).await, 0);
    assert_eq!(db.count_records("events").await, 1);
}

#[tokio::test]
#[serial]
async fn test_staff_approval_unlocks_registration() {
    let db = test_database!();
    let state = db.app_state(Vec::new());
    let event = db.create_event(0, 0, 0).await;
    let instance = db.create_instance(event.id, Some(tomorrow())).await;

    let staff = db.create_staff_user().await;
    let pending = db.create_user(false).await;
    let staff_token = state.services.auth_service.issue_token(staff.id).unwrap().access_token;
    let pending_token = state.services.auth_service.issue_token(pending.id).unwrap().access_token;
    let app = build_router(state);

    // Only staff may see the queue
    let response = app
        .clone()
        .oneshot(authorized("GET", "/events/staff/unapproved-users/", &pending_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authorized("GET", "/events/staff/unapproved-users/", &staff_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let queue = json_body(response).await;
    assert_eq!(queue["total"], 1);
    assert_eq!(queue["items"][0]["id"], pending.id);
    assert_eq!(queue["items"][0]["approved"], false);

    let response = app
        .clone()
        .oneshot(register_request(instance.id, &pending_token, "leader"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authorized("POST", &format!("/events/staff/users/{}/approve/", pending.id), &staff_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["approved"], true);

    let response = app
        .clone()
        .oneshot(register_request(instance.id, &pending_token, "leader"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(db.registrations_for(instance.id).await, 1);

    let response = app
        .oneshot(authorized("GET", "/events/staff/unapproved-users/", &staff_token))
        .await
        .unwrap();
    let queue = json_body(response).await;
    assert_eq!(queue["total"], 0);
    assert_eq!(queue["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[serial]
async fn test_my_events_lists_normal_instances_only() {
    let db = test_database!();
    let state = db.app_state(Vec::new());
    let service = db.service();
    let event = db.create_event(0, 0, 0).await;
    let kept = db.create_instance(event.id, Some(tomorrow())).await;
    let dropped = db.create_instance(event.id, Some(tomorrow())).await;

    let user = db.create_user(true).await;
    let token = state.services.auth_service.issue_token(user.id).unwrap().access_token;
    let app = build_router(state);

    for instance_id in [kept.id, dropped.id] {
        let response = app
            .clone()
            .oneshot(register_request(instance_id, &token, "leader"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    service
        .instances
        .update(dropped.id, UpdateInstanceRequest { status: Some(InstanceStatus::Canceled), ..Default::default() })
        .await
        .unwrap();

    let response = app.oneshot(authorized("GET", "/events/myevents/", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["instance_id"], kept.id.to_string());
    assert_eq!(items[0]["status"], "normal");
    assert_eq!(items[0]["role"], "leader");
    assert_eq!(items[0]["event_id"], event.id);

    // The canceled registration still exists, it is only hidden
    assert_eq!(db.registrations_for(dropped.id).await, 1);
}
