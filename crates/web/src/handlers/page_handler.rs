//! Dashboard and placeholder pages.

use axum::{
    extract::{Extension, OriginalUri, Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;

use common::AppResult;

use crate::flash;
use crate::middleware::CurrentUser;
use crate::routes::paths;
use crate::state::AppState;
use crate::templates::Page;

/// Create page routes (login required)
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route(paths::DASHBOARD, get(dashboard))
        .route("/temp/*path", get(temp_page))
}

/// Landing page after login
pub async fn dashboard(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, messages) = flash::take(jar);
    let html = Page::new("dashboard.html", "Dashboard")
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

/// "Under construction" page for menu entries without a real page yet
pub async fn temp_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Extension(current_user): Extension<CurrentUser>,
    Path(path): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, messages) = flash::take(jar);
    let html = Page::new("temp_page.html", title_from_path(&path))
        .with("path", &path)
        .messages(messages)
        .render(&state, Some(&current_user), uri.path())?;

    Ok((jar, html).into_response())
}

/// `sales/list/` becomes `Sales List`.
///
/// Slashes become spaces, each run of letters starts upper case and
/// continues lower case, and the result is trimmed.
pub fn title_from_path(path: &str) -> String {
    let mut title = String::with_capacity(path.len());
    let mut in_word = false;

    for c in path.chars() {
        let c = if c == '/' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }

    title.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("sales/list/"), "Sales List");
        assert_eq!(title_from_path("inventory/products/new/"), "Inventory Products New");
        assert_eq!(title_from_path("financial/overview"), "Financial Overview");
    }

    #[test]
    fn test_title_from_path_word_boundaries() {
        assert_eq!(title_from_path("stock-control/"), "Stock-Control");
        assert_eq!(title_from_path("REPORTS/q3report"), "Reports Q3Report");
        assert_eq!(title_from_path(""), "");
    }
}
