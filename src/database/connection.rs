//! PostgreSQL pool setup, migrations and health check

use std::time::{Duration, Instant};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{debug, info};
use crate::config::DatabaseConfig;
use crate::utils::errors::Result;

pub type DatabasePool = Pool<Postgres>;

/// Pool options derived from the `database` settings section
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(config.idle_timeout_seconds.map(Duration::from_secs))
}

/// Connect the pool and make sure the server answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool> {
    let pool = pool_options(config).connect(&config.url).await?;
    health_check(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded migrations in `./migrations`
pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    let started = Instant::now();
    sqlx::migrate!("./migrations").run(pool).await?;

    info!(duration_ms = started.elapsed().as_millis() as u64, "Database migrations applied");
    Ok(())
}

/// Round trip to the server; used by `/ready` and at startup
pub async fn health_check(pool: &DatabasePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    debug!("Database health check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_follow_settings() {
        let config = DatabaseConfig {
            url: "postgresql://db.internal/registrations".to_string(),
            max_connections: 4,
            min_connections: 2,
            acquire_timeout_seconds: 5,
            idle_timeout_seconds: None,
        };
        let options = pool_options(&config);

        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[test]
    fn test_default_idle_timeout() {
        let options = pool_options(&DatabaseConfig::default());
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
    }
}
