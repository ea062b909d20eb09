//! Service layer - business logic.

mod auth_service;
mod user_service;

pub use auth_service::{
    AuthService, Authenticator, Claims, LoginAttempt, PasswordChange, Registration, SessionToken,
};
pub use user_service::{UserManager, UserService};
