//! Huddle Database Crate
//!
//! Connection management and schema migrations for the SQLite database that
//! backs channel and message storage.

use huddle_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod migrations;

pub use connection::prepare_database;
pub use migrations::run_migrations;

/// Connect to the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
