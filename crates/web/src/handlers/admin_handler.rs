//! Administration index.

use axum::{
    extract::{Extension, OriginalUri, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;

use common::AppResult;
use domain::ADMIN_RECENT_LOGINS;

use crate::flash;
use crate::middleware::{require_superuser, CurrentUser};
use crate::routes::paths;
use crate::state::AppState;
use crate::templates::Page;

/// Create admin routes (superuser only)
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(paths::ADMIN_INDEX, get(admin_index))
}

/// Account totals and the latest logins across all users
pub async fn admin_index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    require_superuser(&current_user)?;

    let counts = state.users.user_counts().await?;
    let activity = state.users.recent_activity(ADMIN_RECENT_LOGINS).await?;

    let (jar, messages) = flash::take(jar);
    let html = Page::new("admin_index.html", "Administration")
        .with("counts", &counts)
        .with("activity", &activity)
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}
