//! HTTP request handlers.

pub mod account_handler;
pub mod admin_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod page_handler;
pub mod user_handler;

use serde::Serialize;

use domain::ProfileRole;

pub use account_handler::account_routes;
pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use health_handler::health_routes;
pub use page_handler::page_routes;
pub use user_handler::directory_routes;

/// Role as shown in templates.
#[derive(Debug, Clone, Serialize)]
pub struct RoleView {
    pub value: &'static str,
    pub label: &'static str,
    pub badge: &'static str,
}

impl From<ProfileRole> for RoleView {
    fn from(role: ProfileRole) -> Self {
        Self {
            value: role.as_str(),
            label: role.label(),
            badge: role.badge(),
        }
    }
}

/// Every role, for select boxes
pub fn role_choices() -> Vec<RoleView> {
    ProfileRole::ALL.into_iter().map(RoleView::from).collect()
}
