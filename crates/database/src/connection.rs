use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use std::env;
use std::time::Duration;

/// Reads `DATABASE_URL`, loading a `.env` file first if one is present.
pub fn database_url() -> Result<String, DbError> {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))
}

/// Establishes a connection pool to the MySQL price store.
///
/// A failure here is fatal for the caller; there is no retry.
pub async fn connect(settings: &DatabaseConfig) -> Result<MySqlPool, DbError> {
    let database_url = database_url()?;

    let pool = pool_options(settings).connect(&database_url).await?;

    tracing::info!(max_connections = settings.max_connections, "Connected to the price store.");
    Ok(pool)
}

/// Builds a pool that only opens connections when first used.
pub fn connect_lazy(settings: &DatabaseConfig, database_url: &str) -> Result<MySqlPool, DbError> {
    Ok(pool_options(settings).connect_lazy(database_url)?)
}

fn pool_options(settings: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
}
