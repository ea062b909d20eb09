//! Middleware for sessions and access control.

mod session;

pub use session::{
    clear_session, require_login, require_staff, require_superuser, session_middleware,
    start_session, CurrentUser, SESSION_COOKIE,
};
