//! Own profile and password pages.

use axum::{
    extract::{Extension, OriginalUri, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;

use accounts::service::PasswordChange;
use common::{AppError, AppResult};
use domain::{Translator, PROFILE_RECENT_LOGINS};

use super::{role_choices, RoleView};
use crate::flash::{self, FlashMessage};
use crate::forms::{FormErrors, PasswordChangeForm, ProfileEditForm};
use crate::middleware::{start_session, CurrentUser};
use crate::routes::paths;
use crate::state::AppState;
use crate::templates::Page;

/// Create profile routes (login required)
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/", get(profile))
        .route("/profile/edit/", get(profile_edit_page).post(profile_edit))
        .route(
            "/password/change/",
            get(password_change_page).post(password_change),
        )
}

/// Show the current user's profile
pub async fn profile(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let profile = state.users.get_profile(current_user.id()).await?;
    let logins = state
        .users
        .recent_logins(current_user.id(), PROFILE_RECENT_LOGINS)
        .await?;

    let (jar, messages) = flash::take(jar);
    let html = Page::new("profile.html", "My Profile")
        .with("profile", &profile)
        .with("role", &RoleView::from(profile.role))
        .with("logins", &logins)
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

fn profile_edit_form_page(form: &ProfileEditForm, errors: &FormErrors) -> Page {
    Page::new("profile_edit.html", "Edit Profile")
        .with("form", form)
        .with("errors", errors)
        .with("roles", &role_choices())
}

/// Show the profile edit form
pub async fn profile_edit_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let profile = state.users.get_profile(current_user.id()).await?;
    let form = ProfileEditForm::from_existing(current_user.user(), &profile);

    let (jar, messages) = flash::take(jar);
    let html = profile_edit_form_page(&form, &FormErrors::default())
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

/// Save account and profile fields
pub async fn profile_edit(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<ProfileEditForm>,
) -> AppResult<Response> {
    let mut errors = form.errors();

    if errors.is_empty() {
        match state
            .users
            .update_account(current_user.id(), form.account())
            .await
        {
            Ok(_) => {
                state
                    .users
                    .update_profile(current_user.id(), form.profile())
                    .await?;

                let jar = flash::push(
                    jar,
                    FlashMessage::success(
                        state.translator.translate("Your profile has been updated!"),
                    ),
                );
                return Ok((jar, Redirect::to(paths::PROFILE)).into_response());
            }
            Err(AppError::Conflict(_)) => {
                errors.add("username", "A user with that username already exists.");
            }
            Err(e) => return Err(e),
        }
    }

    let html = profile_edit_form_page(&form, &errors)
        .message(FlashMessage::error(
            state.translator.translate("Please correct the errors below."),
        ))
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

fn password_form_page(errors: &FormErrors) -> Page {
    // Password fields are never echoed back
    Page::new("password_change.html", "Change Password")
        .with("form", &serde_json::json!({}))
        .with("errors", errors)
}

/// Show the password change form
pub async fn password_change_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, messages) = flash::take(jar);
    let html = password_form_page(&FormErrors::default())
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

/// Replace the password and re-issue the session
pub async fn password_change(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<PasswordChangeForm>,
) -> AppResult<Response> {
    let mut errors = form.errors();

    if errors.is_empty() {
        let change = PasswordChange {
            old_password: form.old_password.clone(),
            new_password: form.new_password1.clone(),
            remember: current_user.remember(),
        };

        match state.auth.change_password(current_user.id(), change).await {
            Ok(session) => {
                let jar = start_session(jar, &session, &state.config);
                let jar = flash::push(
                    jar,
                    FlashMessage::success(
                        state.translator.translate("Your password has been changed!"),
                    ),
                );
                return Ok((jar, Redirect::to(paths::PROFILE)).into_response());
            }
            Err(AppError::InvalidCredentials) => {
                errors.add("old_password", "Your old password was entered incorrectly.");
            }
            Err(AppError::Validation(message)) => {
                errors.add("new_password1", message);
            }
            Err(e) => return Err(e),
        }
    }

    let html = password_form_page(&errors)
        .message(FlashMessage::error(
            state.translator.translate("Please correct the errors below."),
        ))
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}
