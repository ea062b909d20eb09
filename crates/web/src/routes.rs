//! Route configuration and the named route table.

use std::collections::BTreeMap;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use domain::{DomainError, DomainResult, RouteResolver};

use crate::handlers::{
    account_routes, admin_routes, auth_routes, directory_routes, health_routes, page_routes,
};
use crate::middleware::{require_login, session_middleware};
use crate::state::AppState;

/// URL paths of the named routes.
pub mod paths {
    pub const DASHBOARD: &str = "/";
    pub const LOGIN: &str = "/accounts/login/";
    pub const LOGOUT: &str = "/accounts/logout/";
    pub const REGISTER: &str = "/accounts/register/";
    pub const PROFILE: &str = "/accounts/profile/";
    pub const PROFILE_EDIT: &str = "/accounts/profile/edit/";
    pub const PASSWORD_CHANGE: &str = "/accounts/password/change/";
    pub const USER_LIST: &str = "/accounts/users/";
    pub const ADMIN_INDEX: &str = "/admin/";
    pub const HEALTH: &str = "/health";
}

/// Symbolic name to path table, used by the menu and the templates.
#[derive(Debug, Clone)]
pub struct NamedRoutes {
    routes: BTreeMap<&'static str, &'static str>,
}

impl NamedRoutes {
    pub fn new() -> Self {
        let routes = [
            ("dashboard", paths::DASHBOARD),
            ("accounts:login", paths::LOGIN),
            ("accounts:logout", paths::LOGOUT),
            ("accounts:register", paths::REGISTER),
            ("accounts:profile", paths::PROFILE),
            ("accounts:profile_edit", paths::PROFILE_EDIT),
            ("accounts:password_change", paths::PASSWORD_CHANGE),
            ("accounts:user_list", paths::USER_LIST),
            ("admin:index", paths::ADMIN_INDEX),
            ("health", paths::HEALTH),
        ]
        .into_iter()
        .collect();

        Self { routes }
    }

    /// All routes, for template contexts
    pub fn table(&self) -> &BTreeMap<&'static str, &'static str> {
        &self.routes
    }
}

impl Default for NamedRoutes {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteResolver for NamedRoutes {
    fn reverse(&self, name: &str) -> DomainResult<String> {
        self.routes
            .get(name)
            .map(|path| path.to_string())
            .ok_or_else(|| DomainError::unknown_route(name))
    }
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Account pages: login, logout and registration are public
    let accounts = auth_routes().merge(
        account_routes()
            .merge(directory_routes())
            .route_layer(middleware::from_fn(require_login)),
    );

    let protected = page_routes()
        .merge(admin_routes())
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .merge(health_routes())
        .nest("/accounts", accounts)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_known_names() {
        let routes = NamedRoutes::new();
        assert_eq!(routes.reverse("dashboard").unwrap(), "/");
        assert_eq!(routes.reverse("admin:index").unwrap(), "/admin/");
        assert_eq!(routes.reverse("accounts:login").unwrap(), "/accounts/login/");
    }

    #[test]
    fn test_reverse_unknown_name() {
        let routes = NamedRoutes::new();
        assert_eq!(
            routes.reverse("reports:index"),
            Err(DomainError::unknown_route("reports:index"))
        );
    }
}
