//! Contact repository implementation

use sqlx::PgPool;
use crate::models::contact::{Contact, CreateContactRequest, UpdateContactRequest};
use crate::utils::errors::{SwingRegistrationsError, Result};

#[derive(Clone, Debug)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new contact
    pub async fn create(&self, request: CreateContactRequest) -> Result<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, last_name, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, phone, email
            "#
        )
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.phone)
        .bind(request.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Find contact by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT id, first_name, last_name, phone, email FROM contacts WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Update contact
    pub async fn update(&self, id: i64, request: UpdateContactRequest) -> Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email)
            WHERE id = $1
            RETURNING id, first_name, last_name, phone, email
            "#
        )
        .bind(id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.phone)
        .bind(request.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Delete contact; refused while an event still references it
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SwingRegistrationsError::on_foreign_key_violation(e, "Contact is still referenced by an event"))?;

        Ok(result.rows_affected() > 0)
    }

    /// List contacts by last name, first name
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, first_name, last_name, phone, email FROM contacts ORDER BY last_name ASC, first_name ASC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    /// Count total contacts
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
