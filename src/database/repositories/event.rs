//! Event repository implementation

use std::time::Instant;
use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use crate::models::event::{Event, EventType, CreateEventRequest, UpdateEventRequest};
use crate::utils::errors::{SwingRegistrationsError, Result};
use crate::utils::logging::log_database_operation;

const EVENT_COLUMNS: &str = "id, title, contact_id, summary, max_leaders, max_followers, max_participants, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event and attach its tags
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, contact_id, summary, max_leaders, max_followers, max_participants, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.title)
        .bind(request.contact_id)
        .bind(request.summary)
        .bind(request.max_leaders)
        .bind(request.max_followers)
        .bind(request.max_participants)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Contact does not exist"))?;

        replace_tags(&mut tx, event.id, &request.event_type_ids).await?;

        tx.commit().await?;
        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event; tags are replaced when `event_type_ids` is present
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                contact_id = COALESCE($3, contact_id),
                summary = COALESCE($4, summary),
                max_leaders = COALESCE($5, max_leaders),
                max_followers = COALESCE($6, max_followers),
                max_participants = COALESCE($7, max_participants),
                updated_at = $8
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.contact_id)
        .bind(request.summary)
        .bind(request.max_leaders)
        .bind(request.max_followers)
        .bind(request.max_participants)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Contact does not exist"))?;

        let Some(event) = event else {
            return Ok(None);
        };

        if let Some(type_ids) = &request.event_type_ids {
            replace_tags(&mut tx, event.id, type_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(event))
    }

    /// Delete an event with everything it owns: registrations of its
    /// instances, the instances, and its tag links
    ///
    /// The instance rows are locked first, so a registration in flight
    /// commits before its row is swept up with the rest.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM event_instances WHERE event_id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM registrations WHERE event_instance_id IN (SELECT id FROM event_instances WHERE event_id = $1)"
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM event_instances WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Event instances changed during delete, retry"))?;

        sqlx::query("DELETE FROM event_event_types WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log_database_operation("cascade_delete", "events", started.elapsed().as_millis() as u64, true);
        Ok(result.rows_affected() > 0)
    }

    /// List events with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events run by a contact
    pub async fn list_for_contact(&self, contact_id: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE contact_id = $1 ORDER BY title ASC"
        ))
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Tags of an event ordered by name
    pub async fn event_types(&self, event_id: i64) -> Result<Vec<EventType>> {
        let types = sqlx::query_as::<_, EventType>(
            r#"
            SELECT et.id, et.name
            FROM event_types et
            INNER JOIN event_event_types eet ON eet.event_type_id = et.id
            WHERE eet.event_id = $1
            ORDER BY et.name ASC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

async fn replace_tags(tx: &mut Transaction<'_, Postgres>, event_id: i64, type_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM event_event_types WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    if type_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO event_event_types (event_id, event_type_id)
        SELECT $1, type_id FROM UNNEST($2::BIGINT[]) AS type_id
        ON CONFLICT DO NOTHING
        "#
    )
    .bind(event_id)
    .bind(type_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Unknown event type"))?;

    Ok(())
}
