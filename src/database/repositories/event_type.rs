//! Event type repository implementation

use sqlx::PgPool;
use crate::models::event::EventType;
use crate::utils::errors::{SwingRegistrationsError, Result};

#[derive(Clone, Debug)]
pub struct EventTypeRepository {
    pool: PgPool,
}

impl EventTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an event type; names are unique ignoring case
    pub async fn create(&self, name: &str) -> Result<EventType> {
        let event_type = sqlx::query_as::<_, EventType>(
            "INSERT INTO event_types (name) VALUES ($1) RETURNING id, name"
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SwingRegistrationsError::on_unique_violation(e, "Event type already exists (case insensitive match)"))?;

        Ok(event_type)
    }

    /// List all event types by name
    pub async fn list(&self) -> Result<Vec<EventType>> {
        let types = sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(types)
    }

    /// Delete an event type and detach it from every event
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM event_event_types WHERE event_type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM event_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
