//! Application state for dependency injection.

use std::sync::Arc;

use async_trait::async_trait;

use accounts::infra::Database;
use accounts::service::{AuthService, UserService};
use accounts::Services;
use common::AppResult;
use domain::Catalog;

use crate::config::WebConfig;
use crate::routes::NamedRoutes;
use crate::templates::Templates;

/// Connectivity probe used by the health endpoint.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

#[async_trait]
impl HealthCheck for Database {
    async fn ping(&self) -> AppResult<()> {
        Database::ping(self).await?;
        Ok(())
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub database: Arc<dyn HealthCheck>,
    pub templates: Arc<Templates>,
    pub translator: Arc<Catalog>,
    pub routes: Arc<NamedRoutes>,
    pub config: WebConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        auth: Arc<dyn AuthService>,
        users: Arc<dyn UserService>,
        database: Arc<dyn HealthCheck>,
        config: WebConfig,
    ) -> AppResult<Self> {
        let translator = Arc::new(Catalog::for_language(&config.language));
        let templates = Arc::new(Templates::new(translator.clone())?);

        Ok(Self {
            auth,
            users,
            database,
            templates,
            translator,
            routes: Arc::new(NamedRoutes::new()),
            config,
        })
    }

    /// Build the state from wired account services.
    pub fn from_services(services: Services, config: WebConfig) -> AppResult<Self> {
        Self::new(
            services.auth,
            services.users,
            Arc::new(services.database),
            config,
        )
    }
}
