//! Event instance repository implementation

use sqlx::PgPool;
use uuid::Uuid;
use crate::models::event::{CreateInstanceRequest, EventInstance, InstanceFilter, UpdateInstanceRequest};
use crate::utils::errors::{SwingRegistrationsError, Result};

const INSTANCE_COLUMNS: &str = "id, event_id, description, date, status";

#[derive(Clone, Debug)]
pub struct InstanceRepository {
    pool: PgPool,
}

impl InstanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new instance with a fresh v4 id
    pub async fn create(&self, request: CreateInstanceRequest) -> Result<EventInstance> {
        let instance = sqlx::query_as::<_, EventInstance>(&format!(
            r#"
            INSERT INTO event_instances (id, event_id, description, date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INSTANCE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.event_id)
        .bind(request.description)
        .bind(request.date)
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Event does not exist"))?;

        Ok(instance)
    }

    /// Find instance by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventInstance>> {
        let instance = sqlx::query_as::<_, EventInstance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM event_instances WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(instance)
    }

    /// Update instance
    pub async fn update(&self, id: Uuid, request: UpdateInstanceRequest) -> Result<Option<EventInstance>> {
        let instance = sqlx::query_as::<_, EventInstance>(&format!(
            r#"
            UPDATE event_instances
            SET description = COALESCE($2, description),
                date = COALESCE($3, date),
                status = COALESCE($4, status)
            WHERE id = $1
            RETURNING {INSTANCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.description)
        .bind(request.date)
        .bind(request.status.map(|status| status.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(instance)
    }

    /// Delete an instance together with its registrations
    ///
    /// Locks the row first so it waits for any registration holding it.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM event_instances WHERE id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM registrations WHERE event_instance_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM event_instances WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Instance registrations changed during delete, retry"))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Instances of one event ordered by date
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<EventInstance>> {
        let instances = sqlx::query_as::<_, EventInstance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM event_instances WHERE event_id = $1 ORDER BY date ASC NULLS LAST, id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(instances)
    }

    /// Staff listing with optional status and date filters
    pub async fn list(&self, filter: &InstanceFilter, limit: i64, offset: i64) -> Result<Vec<EventInstance>> {
        let instances = sqlx::query_as::<_, EventInstance>(&format!(
            r#"
            SELECT {INSTANCE_COLUMNS} FROM event_instances
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::DATE IS NULL OR date = $2)
            ORDER BY date ASC NULLS LAST, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(instances)
    }

    /// Count for the staff listing
    pub async fn count_filtered(&self, filter: &InstanceFilter) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM event_instances
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::DATE IS NULL OR date = $2)
            "#
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count total instances
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM event_instances")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count instances with status normal
    pub async fn count_available(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM event_instances WHERE status = 'normal'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
