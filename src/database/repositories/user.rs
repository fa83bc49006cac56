//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::registration::Role;
use crate::models::user::{User, UserProfile, UserWithProfile, CreateUserRequest};
use crate::utils::errors::{SwingRegistrationsError, Result};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_staff, created_at, updated_at";
const PROFILE_COLUMNS: &str = "user_id, role_preference, approved, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user together with their profile
    pub async fn create(&self, request: CreateUserRequest) -> Result<(User, UserProfile)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.username)
        .bind(request.email)
        .bind(request.password_hash)
        .bind(request.is_staff)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| SwingRegistrationsError::on_unique_violation(e, "Username is already taken"))?;

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO user_profiles (user_id, role_preference, approved, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(request.role_preference.map(|role| role.as_str()))
        .bind(request.approved)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((user, profile))
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Profile of a user
    pub async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Set the approval flag
    pub async fn set_approved(&self, user_id: i64, approved: bool) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE user_profiles
            SET approved = $2, updated_at = $3
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(approved)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Set or clear the preferred role
    pub async fn set_role_preference(&self, user_id: i64, role: Option<Role>) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE user_profiles
            SET role_preference = $2, updated_at = $3
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(role.map(|role| role.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Accounts waiting for approval, oldest first
    pub async fn list_unapproved(&self, limit: i64, offset: i64) -> Result<Vec<UserWithProfile>> {
        let users = sqlx::query_as::<_, UserWithProfile>(
            r#"
            SELECT u.id, u.username, u.email, u.is_staff, p.role_preference, p.approved, u.created_at
            FROM users u
            INNER JOIN user_profiles p ON p.user_id = u.id
            WHERE p.approved = FALSE
            ORDER BY u.created_at ASC, u.id ASC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count accounts waiting for approval
    pub async fn count_unapproved(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_profiles WHERE approved = FALSE")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Delete a user with their registrations and profile
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM registrations WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
