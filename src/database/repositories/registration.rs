//! Registration repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use crate::models::event::InstanceStatus;
use crate::models::registration::{Registration, Role, RoleCounts};
use crate::models::InstanceCapacity;
use crate::services::registration::RegistrationStore;
use crate::utils::errors::{SwingRegistrationsError, Result};

/// A registration as listed on the user's own page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRegistrationRow {
    pub instance_id: Uuid,
    pub event_id: i64,
    pub event_title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: InstanceStatus,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub registered_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CountsRow {
    leaders: i64,
    followers: i64,
    double_roles: i64,
}

impl From<CountsRow> for RoleCounts {
    fn from(row: CountsRow) -> Self {
        RoleCounts {
            leaders: row.leaders,
            followers: row.followers,
            double_roles: row.double_roles,
        }
    }
}

const COUNTS_SQL: &str = r#"
    SELECT
        COUNT(*) FILTER (WHERE role = 'leader') AS leaders,
        COUNT(*) FILTER (WHERE role = 'follower') AS followers,
        COUNT(*) FILTER (WHERE role = 'double_role') AS double_roles
    FROM registrations
    WHERE event_instance_id = $1
"#;

#[derive(Clone, Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a transactional unit of work for the registration evaluator
    pub async fn begin(&self) -> Result<PgRegistrationStore<'static>> {
        let tx = self.pool.begin().await?;
        Ok(PgRegistrationStore { tx })
    }

    /// Live counts for one instance
    pub async fn counts(&self, instance_id: Uuid) -> Result<RoleCounts> {
        let row = sqlx::query_as::<_, CountsRow>(COUNTS_SQL)
            .bind(instance_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// Registration held by a user for an instance
    pub async fn find(&self, user_id: i64, instance_id: Uuid) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, user_id, event_instance_id, role, registered_at FROM registrations WHERE user_id = $1 AND event_instance_id = $2"
        )
        .bind(user_id)
        .bind(instance_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Registrations for an instance, oldest first
    pub async fn list_for_instance(&self, instance_id: Uuid) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, user_id, event_instance_id, role, registered_at FROM registrations WHERE event_instance_id = $1 ORDER BY registered_at ASC"
        )
        .bind(instance_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Active (status normal) registrations of a user, by instance date
    pub async fn list_active_for_user(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<UserRegistrationRow>> {
        let rows = sqlx::query_as::<_, UserRegistrationRow>(
            r#"
            SELECT ei.id AS instance_id, e.id AS event_id, e.title AS event_title, ei.description, ei.date, ei.status,
                   r.role, r.registered_at
            FROM registrations r
            INNER JOIN event_instances ei ON ei.id = r.event_instance_id
            INNER JOIN events e ON e.id = ei.event_id
            WHERE r.user_id = $1 AND ei.status = 'normal'
            ORDER BY ei.date ASC NULLS LAST, ei.id ASC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count of a user's active registrations
    pub async fn count_active_for_user(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM registrations r
            INNER JOIN event_instances ei ON ei.id = r.event_instance_id
            WHERE r.user_id = $1 AND ei.status = 'normal'
            "#
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}

/// Transactional [`RegistrationStore`] over PostgreSQL
///
/// `load_instance` takes a `FOR UPDATE` lock on the instance row, so every
/// evaluation against the same instance is serialized until `commit` or drop.
pub struct PgRegistrationStore<'c> {
    tx: Transaction<'c, Postgres>,
}

impl PgRegistrationStore<'_> {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore<'_> {
    async fn load_instance(&mut self, instance_id: Uuid) -> Result<Option<InstanceCapacity>> {
        let instance = sqlx::query_as::<_, InstanceCapacity>(
            r#"
            SELECT ei.id, ei.event_id, ei.date, ei.status, e.max_leaders, e.max_followers, e.max_participants
            FROM event_instances ei
            INNER JOIN events e ON e.id = ei.event_id
            WHERE ei.id = $1
            FOR UPDATE OF ei
            "#
        )
        .bind(instance_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(instance)
    }

    async fn role_counts(&mut self, instance_id: Uuid) -> Result<RoleCounts> {
        let row = sqlx::query_as::<_, CountsRow>(COUNTS_SQL)
            .bind(instance_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(row.into())
    }

    async fn registration_exists(&mut self, user_id: i64, instance_id: Uuid) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE user_id = $1 AND event_instance_id = $2)"
        )
        .bind(user_id)
        .bind(instance_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exists.0)
    }

    async fn insert_registration(&mut self, user_id: i64, instance_id: Uuid, role: Role) -> Result<Registration> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (user_id, event_instance_id, role, registered_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, event_instance_id, role, registered_at
            "#
        )
        .bind(user_id)
        .bind(instance_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| SwingRegistrationsError::on_unique_violation(e, "User is already registered for this instance"))?;

        Ok(registration)
    }

    async fn delete_registration(&mut self, user_id: i64, instance_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM registrations WHERE user_id = $1 AND event_instance_id = $2")
            .bind(user_id)
            .bind(instance_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}
