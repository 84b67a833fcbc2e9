//! Runtime wiring for the Huddle backend: telemetry, service
//! initialisation, and shutdown handling.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use huddle_config::AppConfig;
use huddle_database::initialize_database;
use huddle_directory::Directory;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// The backend's long-lived collaborators: the channel database pool and
/// the user/group directory.
#[derive(Clone)]
pub struct Services {
    pub db_pool: SqlitePool,
    pub directory: Arc<Directory>,
}

impl Services {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise channel database")?;

        let directory = Directory::load(&config.directory)
            .await
            .context("failed to load user/group directory")?;

        info!("backend services initialised");

        Ok(Self {
            db_pool,
            directory: Arc::new(directory),
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_config::{DatabaseConfig, DirectoryConfig, HttpConfig};
    use tempfile::TempDir;

    #[tokio::test]
    async fn services_initialise_against_temp_storage() {
        let dir = TempDir::new().unwrap();

        let config = AppConfig {
            http: HttpConfig::default(),
            database: DatabaseConfig {
                url: format!("sqlite://{}", dir.path().join("huddle.db").display()),
                max_connections: 1,
            },
            directory: DirectoryConfig {
                users_path: dir
                    .path()
                    .join("users.json")
                    .to_string_lossy()
                    .into_owned(),
                groups_path: dir
                    .path()
                    .join("groups.json")
                    .to_string_lossy()
                    .into_owned(),
            },
        };

        let services = Services::initialise(&config).await.unwrap();
        sqlx::query("SELECT COUNT(*) FROM channels")
            .fetch_one(&services.db_pool)
            .await
            .unwrap();
    }
}
