use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::persistence::PgOrderStore;
use crate::utils::{retry_with_backoff, RetryConfig};

/// Open the pool, waiting for the database with backoff, ping it and apply the schema.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(config)?;

    let pool = retry_with_backoff(RetryConfig::startup(), |attempt| {
        tracing::info!(attempt, "Connecting to PostgreSQL...");
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options.clone())
    })
    .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    PgOrderStore::ensure_schema(&pool).await?;

    tracing::info!(
        max_connections = config.max_connections,
        statement_timeout_ms = config.statement_timeout.as_millis() as u64,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// Every pooled session runs with `statement_timeout` set.
fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = config.url.parse()?;
    Ok(options.options([(
        "statement_timeout",
        config.statement_timeout.as_millis().to_string(),
    )]))
}
