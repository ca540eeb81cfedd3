use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::gateway::error::GatewayError;

/// Build the connection pool from DATABASE_URL. Constructed once at startup
/// and carried in the application context; closed on shutdown.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, GatewayError> {
    let connection_string = database_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&connection_string)
        .await
        .map_err(GatewayError::Sqlx)?;

    info!(max_connections = config.max_connections, "created database pool");
    Ok(pool)
}

fn database_url() -> Result<String, GatewayError> {
    let raw = std::env::var("DATABASE_URL")
        .map_err(|_| GatewayError::ConfigMissing("DATABASE_URL"))?;
    // Parse up front so a malformed URL fails at startup, not first query
    let url = url::Url::parse(&raw).map_err(|_| GatewayError::InvalidDatabaseUrl)?;
    if url.scheme() != "postgres" && url.scheme() != "postgresql" {
        return Err(GatewayError::InvalidDatabaseUrl);
    }
    Ok(raw)
}

/// Ping the pool to verify connectivity.
pub async fn health_check(pool: &PgPool) -> Result<(), GatewayError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(GatewayError::Sqlx)?;
    Ok(())
}
