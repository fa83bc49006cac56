//! Registration capacity evaluator
//!
//! Decides whether a user may take a role in an event instance and records
//! the registration. The evaluator only talks to storage through
//! [`RegistrationStore`]; one store value is one unit of work, so a
//! transactional store makes the count-check-and-insert atomic.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
use crate::database::repositories::RegistrationRepository;
use crate::models::{CapacityLimits, InstanceCapacity, Registration, Role, RoleCounts};
use crate::utils::errors::{RegistrationRejection, SwingRegistrationsError, Result};
use crate::utils::helpers::today;
use crate::utils::logging::{log_cancellation, log_registration_decision, DecisionOutcome};

/// Storage operations the evaluator depends on
#[async_trait]
pub trait RegistrationStore: Send {
    /// Instance with its event's limits. Transactional stores lock the
    /// instance row here until the unit of work ends.
    async fn load_instance(&mut self, instance_id: Uuid) -> Result<Option<InstanceCapacity>>;

    async fn role_counts(&mut self, instance_id: Uuid) -> Result<RoleCounts>;

    async fn registration_exists(&mut self, user_id: i64, instance_id: Uuid) -> Result<bool>;

    async fn insert_registration(&mut self, user_id: i64, instance_id: Uuid, role: Role) -> Result<Registration>;

    /// Returns the number of rows removed
    async fn delete_registration(&mut self, user_id: i64, instance_id: Uuid) -> Result<u64>;
}

/// What a successful registration attempt did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered { registration: Registration },
    /// The user already held a registration; nothing was written
    AlreadyRegistered,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDecision {
    /// Parent event, where the caller is sent afterwards
    pub event_id: i64,
    #[serde(flatten)]
    pub outcome: RegistrationOutcome,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CancellationOutcome {
    pub event_id: i64,
    pub removed: bool,
}

/// Capacity rule for a role, given the instance's limits and live counts
pub fn check_capacity(role: Role, limits: CapacityLimits, counts: RoleCounts) -> std::result::Result<(), RegistrationRejection> {
    match role {
        Role::Leader => {
            if limits.max_leaders != 0 && counts.leaders >= i64::from(limits.max_leaders) {
                return Err(RegistrationRejection::LeaderCapacityReached);
            }
        }
        Role::Follower => {
            if limits.max_followers != 0 && counts.followers >= i64::from(limits.max_followers) {
                return Err(RegistrationRejection::FollowerCapacityReached);
            }
        }
        Role::DoubleRole => {
            if !limits.offers_double_role() || counts.total() >= i64::from(limits.max_participants) {
                return Err(RegistrationRejection::DoubleRoleUnavailable);
            }
        }
    }

    Ok(())
}

/// Evaluate a registration attempt and insert the registration if admitted
///
/// Checks run in a fixed order: instance status, instance date, role code,
/// existing registration, then capacity.
pub async fn evaluate_registration<S>(
    store: &mut S,
    user_id: i64,
    instance_id: Uuid,
    role_code: &str,
    today: NaiveDate,
) -> Result<RegistrationDecision>
where
    S: RegistrationStore + ?Sized,
{
    let instance = store
        .load_instance(instance_id)
        .await?
        .ok_or(SwingRegistrationsError::InstanceNotFound { instance_id })?;

    if !instance.accepts_registrations_on(today) {
        return Err(RegistrationRejection::InstanceNotRegistrable.into());
    }

    let role = Role::parse(role_code).ok_or(RegistrationRejection::InvalidRole)?;

    if store.registration_exists(user_id, instance_id).await? {
        debug!(user_id = user_id, instance_id = %instance_id, "Duplicate registration ignored");
        return Ok(RegistrationDecision {
            event_id: instance.event_id,
            outcome: RegistrationOutcome::AlreadyRegistered,
        });
    }

    let counts = store.role_counts(instance_id).await?;
    check_capacity(role, instance.limits(), counts)?;

    let registration = store.insert_registration(user_id, instance_id, role).await?;

    Ok(RegistrationDecision {
        event_id: instance.event_id,
        outcome: RegistrationOutcome::Registered { registration },
    })
}

/// Remove the user's registration for an instance, if any
pub async fn evaluate_cancellation<S>(store: &mut S, user_id: i64, instance_id: Uuid) -> Result<CancellationOutcome>
where
    S: RegistrationStore + ?Sized,
{
    let instance = store
        .load_instance(instance_id)
        .await?
        .ok_or(SwingRegistrationsError::InstanceNotFound { instance_id })?;

    let removed = store.delete_registration(user_id, instance_id).await?;

    Ok(CancellationOutcome {
        event_id: instance.event_id,
        removed: removed > 0,
    })
}

/// Registration service running the evaluator inside a database transaction
#[derive(Clone)]
pub struct RegistrationService {
    registrations: RegistrationRepository,
}

impl RegistrationService {
    pub fn new(registrations: RegistrationRepository) -> Self {
        Self { registrations }
    }

    /// Register `user_id` for `instance_id` in the role given by `role_code`
    pub async fn register(&self, user_id: i64, instance_id: Uuid, role_code: &str) -> Result<RegistrationDecision> {
        let mut store = self.registrations.begin().await?;
        let result = evaluate_registration(&mut store, user_id, instance_id, role_code, today()).await;

        match &result {
            Ok(decision) => {
                store.commit().await?;
                let outcome = match decision.outcome {
                    RegistrationOutcome::Registered { .. } => DecisionOutcome::Registered,
                    RegistrationOutcome::AlreadyRegistered => DecisionOutcome::AlreadyRegistered,
                };
                log_registration_decision(user_id, instance_id, role_code, outcome);
            }
            Err(SwingRegistrationsError::Rejected(reason)) => {
                log_registration_decision(user_id, instance_id, role_code, DecisionOutcome::Rejected(*reason));
            }
            Err(_) => {}
        }

        result
    }

    /// Cancel the user's registration; missing registrations are a no-op
    pub async fn cancel(&self, user_id: i64, instance_id: Uuid) -> Result<CancellationOutcome> {
        let mut store = self.registrations.begin().await?;
        let outcome = evaluate_cancellation(&mut store, user_id, instance_id).await?;
        store.commit().await?;

        log_cancellation(user_id, instance_id, outcome.removed);
        Ok(outcome)
    }
}
