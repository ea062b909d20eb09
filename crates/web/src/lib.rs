//! Accounts portal web application.
//!
//! Server-rendered pages for logging in, registration, profiles and the
//! staff user directory, with a navigation menu filtered by the viewer's
//! permissions.

pub mod cli;
pub mod commands;
pub mod config;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use routes::{create_router, NamedRoutes};
pub use state::{AppState, HealthCheck};
