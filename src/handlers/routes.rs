//! Router configuration
//!
//! Builds the complete axum router with all endpoints.

use axum::response::Redirect;
use axum::routing::{delete, get, post, put};
use axum::Router;
use super::{accounts, catalog, health, registrations, staff};
use crate::middleware::http_trace_layer;
use crate::state::AppState;

/// Build the complete axum router
pub fn build_router(state: AppState) -> Router {
    let staff_routes = Router::new()
        .route("/events/staff/unapproved-users/", get(staff::list_unapproved))
        .route("/events/staff/users/:id/approve/", post(staff::approve_user))
        .route("/events/staff/users/:id", delete(staff::delete_user))
        .route("/events/staff/contacts", post(staff::create_contact))
        .route("/events/staff/contacts/:id", put(staff::update_contact).delete(staff::delete_contact))
        .route("/events/staff/event-types", get(staff::list_event_types).post(staff::create_event_type))
        .route("/events/staff/event-types/:id", delete(staff::delete_event_type))
        .route("/events/staff/events", post(staff::create_event))
        .route("/events/staff/events/:id", put(staff::update_event).delete(staff::delete_event))
        .route("/events/staff/eventinstances", get(staff::list_instances).post(staff::create_instance))
        .route(
            "/events/staff/eventinstances/:id",
            get(staff::get_instance)
                .put(staff::update_instance)
                .delete(staff::delete_instance),
        );

    let public_routes = Router::new()
        .route("/events/", get(catalog::index))
        .route("/events/events/", get(catalog::list_events))
        .route("/events/events/:id", get(catalog::get_event))
        .route("/events/contacts/", get(catalog::list_contacts))
        .route("/events/contacts/:id", get(catalog::get_contact))
        .route("/events/accounts/register/", post(accounts::sign_up))
        .route("/events/accounts/login/", post(accounts::log_in));

    let user_routes = Router::new()
        .route("/events/myevents/", get(catalog::my_events))
        .route("/events/eventinstances/:id/register/", post(registrations::register))
        .route("/events/eventinstances/:id/cancel/", post(registrations::cancel))
        .route("/events/accounts/profile/", get(accounts::get_profile).put(accounts::update_profile));

    Router::new()
        .route("/", get(|| async { Redirect::permanent("/events/") }))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .merge(public_routes)
        .merge(user_routes)
        .merge(staff_routes)
        .layer(http_trace_layer())
        .with_state(state)
}
