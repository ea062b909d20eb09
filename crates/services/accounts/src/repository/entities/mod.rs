//! SeaORM entities.

pub mod login_history;
pub mod user;
pub mod user_permission;
pub mod user_profile;
