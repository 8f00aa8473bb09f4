//! Database primitives: connection settings and pool construction.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;

/// Shared connection handle, passed by clone into every consumer.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing; set {0}")]
    MissingUrl(&'static str),
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const URL_KEY: &str = "DATABASE_URL";
const MAX_CONNECTIONS_KEY: &str = "DATABASE_MAX_CONNECTIONS";

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        let max_connections = std::env::var(MAX_CONNECTIONS_KEY)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_max_connections);
        Self {
            url: std::env::var(URL_KEY).ok(),
            max_connections,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            max_connections: default_max_connections(),
        }
    }
}

/// Build the shared pool from settings.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings
        .url
        .as_deref()
        .ok_or(DbError::MissingUrl(URL_KEY))?;
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}
