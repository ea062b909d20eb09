//! Migrate command - Database migration management.

use common::AppResult;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::WebConfig;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: WebConfig) -> AppResult<()> {
    let action = match args.action {
        MigrateAction::Up => accounts::MigrateAction::Up,
        MigrateAction::Down => accounts::MigrateAction::Down,
        MigrateAction::Status => accounts::MigrateAction::Status,
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            accounts::MigrateAction::Fresh
        }
    };

    tracing::info!(?action, "Running migration command...");
    accounts::run_migrations(&config.database, action).await
}
