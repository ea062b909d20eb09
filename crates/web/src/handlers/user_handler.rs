//! Staff user directory.

use axum::{
    extract::{Extension, OriginalUri, Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use common::{AppError, AppResult, PaginationParams};
use domain::{DETAIL_RECENT_LOGINS, USER_LIST_PAGE_SIZE};

use super::RoleView;
use crate::flash;
use crate::forms::UserSearch;
use crate::middleware::{require_staff, CurrentUser};
use crate::state::AppState;
use crate::templates::Page;

/// Create directory routes (staff only)
pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list_users))
        .route("/users/:id/", get(get_user))
}

/// List and search users
pub async fn list_users(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    Query(search): Query<UserSearch>,
    jar: CookieJar,
) -> AppResult<Response> {
    require_staff(&current_user)?;

    let query = search.query();
    let page = state
        .users
        .search_users(
            query.clone(),
            PaginationParams {
                page: search.page.clone(),
            },
            USER_LIST_PAGE_SIZE,
        )
        .await?;

    tracing::debug!(
        search = ?query,
        page = page.meta.page,
        total = page.meta.total,
        "user directory listed"
    );

    // Appended to page links so paging keeps the filter
    let search_param = query
        .as_deref()
        .map(|q| format!("&search={}", urlencoding::encode(q)))
        .unwrap_or_default();

    let (jar, messages) = flash::take(jar);
    let html = Page::new("user_list.html", "Users")
        .with("users", &page.data)
        .with("page", &page.meta)
        .with("search", &query.unwrap_or_default())
        .with("search_param", &search_param)
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

/// Show one user with profile and recent logins
pub async fn get_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    require_staff(&current_user)?;

    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;
    let user = state.users.get_user(id).await?;
    let profile = state.users.get_profile(id).await?;
    let logins = state.users.recent_logins(id, DETAIL_RECENT_LOGINS).await?;

    let (jar, messages) = flash::take(jar);
    let html = Page::new("user_detail.html", "Users")
        .with("account", &user)
        .with("profile", &profile)
        .with("role", &RoleView::from(profile.role))
        .with("logins", &logins)
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}
