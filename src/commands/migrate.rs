//! `offboarding migrate up|down|status|fresh`.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::{Config, DatabaseSource};
use crate::errors::AppResult;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    if config.database_source == DatabaseSource::SqliteFallback {
        tracing::warn!("No DATABASE_URL or PG_* settings, migrating the local sqlite database");
    }

    let db = Database::open(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.migrate_up().await?;
            tracing::info!("schema is up to date");
        }
        MigrateAction::Down => {
            db.migrate_down().await?;
            tracing::info!("last migration rolled back");
        }
        MigrateAction::Status => {
            for state in db.migration_states().await? {
                let mark = if state.applied { "applied" } else { "pending" };
                println!("{:<60} {}", state.name, mark);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping users and cases, then re-running all migrations");
            db.migrate_fresh().await?;
            tracing::info!("schema rebuilt from scratch");
        }
    }

    Ok(())
}
