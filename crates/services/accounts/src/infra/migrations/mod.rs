//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users_table;
mod m20241001_000002_create_user_profiles_table;
mod m20241001_000003_create_login_history_table;
mod m20241001_000004_create_user_permissions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users_table::Migration),
            Box::new(m20241001_000002_create_user_profiles_table::Migration),
            Box::new(m20241001_000003_create_login_history_table::Migration),
            Box::new(m20241001_000004_create_user_permissions_table::Migration),
        ]
    }
}
