//! Login, logout and registration pages.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Extension, OriginalUri, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;

use accounts::service::{LoginAttempt, Registration};
use common::{AppError, AppResult};
use domain::Translator;

use crate::flash::{self, FlashMessage};
use crate::forms::{safe_next, FormErrors, LoginForm, NextParam, RegisterForm};
use crate::middleware::{clear_session, start_session, CurrentUser};
use crate::routes::paths;
use crate::state::AppState;
use crate::templates::Page;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout).post(logout))
        .route("/register/", get(register_page).post(register))
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn login_form_page(form: &LoginForm, errors: &FormErrors) -> Page {
    Page::new("login.html", "Login")
        .with("form", form)
        .with("errors", errors)
}

/// Show the login form
pub async fn login_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<NextParam>,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(paths::DASHBOARD).into_response());
    }

    let (jar, messages) = flash::take(jar);
    let form = LoginForm {
        next: safe_next(params.next.as_deref()).unwrap_or_default(),
        ..Default::default()
    };

    let html = login_form_page(&form, &FormErrors::default())
        .messages(messages)
        .render(&state, None, uri.path())?;

    Ok((jar, html).into_response())
}

/// Check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(paths::DASHBOARD).into_response());
    }

    let errors = crate::forms::check(&form);
    if !errors.is_empty() {
        let html = login_form_page(&form, &errors)
            .message(FlashMessage::error(
                state.translator.translate("Invalid username or password."),
            ))
            .render(&state, None, uri.path())?;
        return Ok((jar, html).into_response());
    }

    let attempt = LoginAttempt {
        identifier: form.username.clone(),
        password: form.password.clone(),
        ip_address: client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr)),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        remember: form.remember_me,
    };

    match state.auth.login(attempt).await {
        Ok(session) => {
            let jar = start_session(jar, &session, &state.config);
            let greeting = state
                .translator
                .translate("Welcome back, {name}!")
                .replace("{name}", &session.user.display_name());
            let jar = flash::push(jar, FlashMessage::success(greeting));

            let target = safe_next(Some(&form.next)).unwrap_or_else(|| paths::DASHBOARD.to_string());
            Ok((jar, Redirect::to(&target)).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let html = login_form_page(&form, &FormErrors::default())
                .message(FlashMessage::error(
                    state.translator.translate("Invalid username or password."),
                ))
                .render(&state, None, uri.path())?;
            Ok((jar, html).into_response())
        }
        Err(e) => Err(e),
    }
}

/// End the session
pub async fn logout(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> Response {
    if let Some(Extension(user)) = user {
        tracing::info!(user_id = %user.id(), "logged out");
    }

    let jar = clear_session(jar);
    let jar = flash::push(
        jar,
        FlashMessage::info(state.translator.translate("You have been logged out.")),
    );

    (jar, Redirect::to(paths::LOGIN)).into_response()
}

fn register_form_page(form: &RegisterForm, errors: &FormErrors) -> Page {
    Page::new("register.html", "Register")
        .with("form", form)
        .with("errors", errors)
}

/// Show the registration form
pub async fn register_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(paths::DASHBOARD).into_response());
    }

    let (jar, messages) = flash::take(jar);
    let html = register_form_page(&RegisterForm::default(), &FormErrors::default())
        .messages(messages)
        .render(&state, None, uri.path())?;

    Ok((jar, html).into_response())
}

/// Create an account
pub async fn register(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(paths::DASHBOARD).into_response());
    }

    let form = form.trimmed();
    let mut errors = form.errors();

    if errors.is_empty() {
        let registration = Registration {
            username: form.username.clone(),
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            password: form.password1.clone(),
        };

        match state.auth.register(registration).await {
            Ok(user) => {
                let text = state
                    .translator
                    .translate("Account created for {username}! You can now log in.")
                    .replace("{username}", &user.username);
                let jar = flash::push(jar, FlashMessage::success(text));
                return Ok((jar, Redirect::to(paths::LOGIN)).into_response());
            }
            Err(AppError::Conflict(entity)) if entity == "Email" => {
                errors.add("email", "This email is already registered.");
            }
            Err(AppError::Conflict(_)) => {
                errors.add("username", "A user with that username already exists.");
            }
            Err(AppError::Validation(message)) => {
                errors.add("password1", message);
            }
            Err(e) => return Err(e),
        }
    }

    let html = register_form_page(&form, &errors)
        .message(FlashMessage::error(
            state.translator.translate("Please correct the errors below."),
        ))
        .render(&state, None, uri.path())?;

    Ok((jar, html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "10.0.0.2:4000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(peer)),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let peer: SocketAddr = "192.168.1.10:4000".parse().unwrap();
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer)),
            Some("192.168.1.10".to_string())
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
