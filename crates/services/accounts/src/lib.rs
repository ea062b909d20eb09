//! Accounts service library.
//!
//! Persistence and business logic for user accounts: registration, login,
//! session tokens, profiles, login history, permissions and the staff
//! directory.

pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::{AppResult, DatabaseConfig, JwtConfig};

use crate::infra::Database;
use crate::repository::{LoginHistoryStore, ProfileStore, UserStore};
use crate::service::{Authenticator, UserManager};

/// Wired services sharing one connection pool.
#[derive(Clone)]
pub struct Services {
    pub database: Database,
    pub auth: Arc<Authenticator>,
    pub users: Arc<UserManager>,
}

/// Connect, apply pending migrations and build the services.
pub async fn connect(database: &DatabaseConfig, jwt: JwtConfig) -> AppResult<Services> {
    let db = Database::connect(database).await?;
    Ok(build_services(db, jwt))
}

/// Build the services on an existing connection.
pub fn build_services(db: Database, jwt: JwtConfig) -> Services {
    let conn = db.get_connection();
    let users = Arc::new(UserStore::new(conn.clone()));
    let profiles = Arc::new(ProfileStore::new(conn.clone()));
    let history = Arc::new(LoginHistoryStore::new(conn));

    Services {
        auth: Arc::new(Authenticator::new(users.clone(), history.clone(), jwt)),
        users: Arc::new(UserManager::new(users, profiles, history)),
        database: db,
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(config: &DatabaseConfig, action: MigrateAction) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
