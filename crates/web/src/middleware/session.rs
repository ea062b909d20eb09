//! Cookie session middleware.
//!
//! The session cookie holds a signed token. Every request with a valid token
//! gets a [`CurrentUser`] in its extensions; anything else is anonymous.

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use accounts::service::SessionToken;
use common::{AppError, AppResult};
use domain::{Principal, User, Viewer};

use crate::config::WebConfig;
use crate::routes::paths;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// Logged-in account of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    principal: Principal,
    remember: bool,
}

impl CurrentUser {
    pub fn new(principal: Principal, remember: bool) -> Self {
        Self {
            principal,
            remember,
        }
    }

    pub fn id(&self) -> Uuid {
        self.principal.user.id
    }

    pub fn user(&self) -> &User {
        &self.principal.user
    }

    /// Whether the session was opened with "remember me"
    pub fn remember(&self) -> bool {
        self.remember
    }
}

impl Viewer for CurrentUser {
    fn has_perm(&self, permission: &str) -> bool {
        self.principal.has_perm(permission)
    }

    fn is_staff(&self) -> bool {
        self.principal.is_staff()
    }

    fn is_superuser(&self) -> bool {
        self.principal.is_superuser()
    }
}

/// Staff members and superusers only.
pub fn require_staff(user: &CurrentUser) -> AppResult<()> {
    if user.is_staff() || user.is_superuser() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Superusers only.
pub fn require_superuser(user: &CurrentUser) -> AppResult<()> {
    if user.is_superuser() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Resolve the session cookie into a [`CurrentUser`].
///
/// Bad, expired or revoked sessions leave the request anonymous, as do
/// tokens issued before the last password change. Storage failures abort
/// the request.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match load_user(&state, cookie.value()).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) | Err(AppError::NotFound) | Err(AppError::Jwt(_)) => {
                tracing::debug!("ignoring stale session cookie");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(next.run(request).await)
}

async fn load_user(state: &AppState, token: &str) -> AppResult<CurrentUser> {
    let claims = state.auth.verify_token(token)?;
    let principal = state.users.load_principal(claims.sub).await?;
    if !claims.is_current_for(&principal.user) {
        return Err(AppError::Unauthorized);
    }
    Ok(CurrentUser::new(principal, claims.remember))
}

/// Redirect anonymous visitors to the login page, remembering where they
/// were going.
pub async fn require_login(request: Request<Body>, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    let target = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    let target = target
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| paths::DASHBOARD.to_string());

    Redirect::to(&format!(
        "{}?next={}",
        paths::LOGIN,
        urlencoding::encode(&target)
    ))
    .into_response()
}

/// Store a freshly issued token in the session cookie.
///
/// Unless the token was issued with "remember me" the cookie ends with the
/// browser session; otherwise it lives as long as the token.
pub fn start_session(jar: CookieJar, token: &SessionToken, config: &WebConfig) -> CookieJar {
    let mut cookie = Cookie::build((SESSION_COOKIE, token.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookies.secure);

    if token.remember {
        cookie = cookie.max_age(time::Duration::seconds(token.expires_in));
    }

    jar.add(cookie)
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
