//! Connection pool for the configured SQL backend, plus schema migrations.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use crate::config::{Config, DatabaseSource, DEFAULT_DB_MAX_CONNECTIONS, SQLITE_FALLBACK_DIR};

pub mod migrations;

pub use migrations::Migrator;

/// One row of `migrate status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the pool and bring the schema up to date. Used by `serve`, `bot` and `seed`.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let db = Self::open(config).await?;
        db.migrate_up().await?;
        tracing::info!(source = ?config.database_source, "database ready");
        Ok(db)
    }

    /// Open the pool and leave the schema alone.
    pub async fn open(config: &Config) -> Result<Self, DbErr> {
        if config.database_source == DatabaseSource::SqliteFallback {
            std::fs::create_dir_all(SQLITE_FALLBACK_DIR).map_err(|e| {
                DbErr::Custom(format!("cannot create {}: {}", SQLITE_FALLBACK_DIR, e))
            })?;
            tracing::warn!(dir = SQLITE_FALLBACK_DIR, "no database configured, using local sqlite");
        }

        Self::open_url(&config.database_url, DEFAULT_DB_MAX_CONNECTIONS).await
    }

    /// `sqlite::memory:` must be opened with a single connection, otherwise
    /// each checkout gets its own empty database.
    pub async fn open_url(url: &str, max_connections: u32) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(10))
            .test_before_acquire(true)
            .sqlx_logging(false);

        Ok(Self {
            connection: SeaDatabase::connect(options).await?,
        })
    }

    /// Handle for repositories; clones share the pool.
    pub fn conn(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    pub async fn migrate_up(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Undo the most recent migration only.
    pub async fn migrate_down(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Drop every table and replay all migrations.
    pub async fn migrate_fresh(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    pub async fn migration_states(&self) -> Result<Vec<MigrationState>, DbErr> {
        let states = Migrator::get_migration_with_status(&self.connection)
            .await?
            .iter()
            .map(|m| MigrationState {
                name: m.name().to_string(),
                applied: matches!(m.status(), MigrationStatus::Applied),
            })
            .collect();

        Ok(states)
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.ping().await
    }
}
