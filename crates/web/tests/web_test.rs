//! Integration tests for the HTML pages.
//!
//! These tests drive the full router with in-memory services, so no
//! database is needed.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use accounts::service::{
    AuthService, Claims, LoginAttempt, PasswordChange, Registration, SessionToken, UserService,
};
use common::{AppError, AppResult, Paginated, PaginationParams};
use domain::{
    AccountUpdate, LoginActivity, LoginRecord, Principal, ProfileUpdate, User, UserCounts,
    UserProfile,
};
use web_lib::config::WebConfig;
use web_lib::{create_router, AppState, HealthCheck};

// =============================================================================
// In-memory services
// =============================================================================

const PASSWORD: &str = "correct-password";

struct Account {
    user: User,
    permissions: BTreeSet<String>,
}

/// Users keyed by their session token
struct Directory {
    accounts: HashMap<String, Account>,
}

impl Directory {
    fn new() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert("user-token".to_string(), account("maria", false, false, &[]));
        accounts.insert(
            "sales-token".to_string(),
            account("joao", false, false, &["sales.view_sale"]),
        );
        accounts.insert("staff-token".to_string(), account("ana", true, false, &[]));
        accounts.insert("root-token".to_string(), account("root", true, true, &[]));
        Self { accounts }
    }

    fn by_id(&self, id: Uuid) -> Option<&Account> {
        self.accounts.values().find(|a| a.user.id == id)
    }

    fn by_username(&self, username: &str) -> Option<(&String, &Account)> {
        self.accounts
            .iter()
            .find(|(_, a)| a.user.username == username)
    }
}

fn account(username: &str, staff: bool, superuser: bool, permissions: &[&str]) -> Account {
    let mut user = User::new(
        Uuid::new_v4(),
        username.to_string(),
        format!("{}@example.com", username),
        "hashed".to_string(),
        username.to_string(),
        "Tester".to_string(),
    );
    user.is_staff = staff;
    user.is_superuser = superuser;

    Account {
        user,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

struct FakeAuth {
    directory: Arc<Directory>,
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        if self.directory.by_username(&registration.username).is_some() {
            return Err(AppError::conflict("Username"));
        }
        Ok(User::new(
            Uuid::new_v4(),
            registration.username,
            registration.email,
            "hashed".to_string(),
            registration.first_name,
            registration.last_name,
        ))
    }

    async fn login(&self, attempt: LoginAttempt) -> AppResult<SessionToken> {
        match self.directory.by_username(&attempt.identifier) {
            Some((token, account)) if attempt.password == PASSWORD => Ok(SessionToken {
                token: token.clone(),
                expires_in: 3600,
                remember: attempt.remember,
                user: account.user.clone(),
            }),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// `remembered-token` is maria's "remember me" session and `stale-token`
    /// one issued for a password she has since changed.
    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (lookup, pwd, remember) = match token {
            "remembered-token" => ("user-token", None, true),
            "stale-token" => ("user-token", Some("replaced-salt".to_string()), false),
            other => (other, None, false),
        };
        let account = self
            .directory
            .accounts
            .get(lookup)
            .ok_or(AppError::Unauthorized)?;
        Ok(Claims {
            sub: account.user.id,
            username: account.user.username.clone(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
            pwd,
            remember,
        })
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        change: PasswordChange,
    ) -> AppResult<SessionToken> {
        if change.old_password != PASSWORD {
            return Err(AppError::InvalidCredentials);
        }
        let account = self.directory.by_id(user_id).ok_or(AppError::NotFound)?;
        Ok(SessionToken {
            token: "user-token".to_string(),
            expires_in: 3600,
            remember: change.remember,
            user: account.user.clone(),
        })
    }
}

struct FakeUsers {
    directory: Arc<Directory>,
}

#[async_trait]
impl UserService for FakeUsers {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.directory
            .by_id(id)
            .map(|a| a.user.clone())
            .ok_or(AppError::NotFound)
    }

    async fn load_principal(&self, id: Uuid) -> AppResult<Principal> {
        let account = self.directory.by_id(id).ok_or(AppError::Unauthorized)?;
        Ok(Principal::new(
            account.user.clone(),
            account.permissions.clone(),
        ))
    }

    async fn search_users(
        &self,
        query: Option<String>,
        params: PaginationParams,
        per_page: u64,
    ) -> AppResult<Paginated<User>> {
        let mut users: Vec<User> = self
            .directory
            .accounts
            .values()
            .map(|a| a.user.clone())
            .filter(|u| match &query {
                Some(q) => u.username.contains(q.as_str()),
                None => true,
            })
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let total = users.len() as u64;
        let page = params.clamp(total, per_page);
        Ok(Paginated::new(users, page, per_page, total))
    }

    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        user.username = update.username;
        user.email = update.email;
        Ok(user)
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        Ok(UserProfile::empty(user_id))
    }

    async fn update_profile(&self, user_id: Uuid, _update: ProfileUpdate) -> AppResult<UserProfile> {
        Ok(UserProfile::empty(user_id))
    }

    async fn recent_logins(&self, user_id: Uuid, _limit: u64) -> AppResult<Vec<LoginRecord>> {
        Ok(vec![LoginRecord {
            id: Uuid::new_v4(),
            user_id,
            login_time: Utc::now(),
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: "test-agent".to_string(),
        }])
    }

    async fn recent_activity(&self, _limit: u64) -> AppResult<Vec<LoginActivity>> {
        Ok(Vec::new())
    }

    async fn user_counts(&self) -> AppResult<UserCounts> {
        Ok(UserCounts {
            total: 4,
            staff: 2,
            superusers: 1,
        })
    }

    async fn create_superuser(
        &self,
        _username: String,
        _email: String,
        _password: String,
    ) -> AppResult<User> {
        Err(AppError::internal("not supported by the fake"))
    }

    async fn grant_permission(&self, _username: &str, _codename: &str) -> AppResult<()> {
        Ok(())
    }

    async fn set_staff(&self, username: &str, _is_staff: bool) -> AppResult<User> {
        self.directory
            .by_username(username)
            .map(|(_, a)| a.user.clone())
            .ok_or(AppError::NotFound)
    }
}

struct FakeDatabase {
    up: bool,
}

#[async_trait]
impl HealthCheck for FakeDatabase {
    async fn ping(&self) -> AppResult<()> {
        if self.up {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app_with_database(up: bool) -> Router {
    let directory = Arc::new(Directory::new());
    let state = AppState::new(
        Arc::new(FakeAuth {
            directory: directory.clone(),
        }),
        Arc::new(FakeUsers { directory }),
        Arc::new(FakeDatabase { up }),
        WebConfig::default(),
    )
    .expect("templates compile");

    create_router(state)
}

fn app() -> Router {
    app_with_database(true)
}

async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::COOKIE, format!("sessionid={}", token));
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Access control
// =============================================================================

#[tokio::test]
async fn test_anonymous_dashboard_redirects_to_login() {
    let response = get(app(), "/", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/?next=%2F");
}

#[tokio::test]
async fn test_redirect_keeps_query_in_next() {
    let response = get(app(), "/accounts/users/?search=ana", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/accounts/login/?next=%2Faccounts%2Fusers%2F%3Fsearch%3Dana"
    );
}

#[tokio::test]
async fn test_unknown_session_is_anonymous() {
    let response = get(app(), "/accounts/profile/", Some("forged-token")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/"));
}

#[tokio::test]
async fn test_directory_forbidden_for_regular_user() {
    let response = get(app(), "/accounts/users/", Some("user-token")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_directory_lists_users_for_staff() {
    let response = get(app(), "/accounts/users/", Some("staff-token")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("maria"));
    assert!(body.contains("root"));
}

#[tokio::test]
async fn test_user_detail_unknown_id_is_not_found() {
    let response = get(app(), "/accounts/users/not-a-uuid/", Some("staff-token")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/accounts/users/{}/", Uuid::new_v4());
    let response = get(app(), &uri, Some("staff-token")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_index_requires_superuser() {
    let response = get(app(), "/admin/", Some("staff-token")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(app(), "/admin/", Some("root-token")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_regular_user_sees_only_main_section() {
    let body = body_text(get(app(), "/", Some("user-token")).await).await;

    assert!(body.contains(r#"data-key="main.dashboard""#));
    assert!(!body.contains(r#"data-key="sales""#));
    assert!(!body.contains(r#"data-key="system""#));
}

#[tokio::test]
async fn test_permission_reveals_section() {
    let body = body_text(get(app(), "/", Some("sales-token")).await).await;

    assert!(body.contains(r#"data-key="sales""#));
    assert!(body.contains(r#"data-key="sales.orders.list""#));
    // Needs sales.add_sale
    assert!(!body.contains(r#"data-key="sales.orders.new""#));
    assert!(!body.contains(r#"data-key="sales.customers""#));
}

#[tokio::test]
async fn test_staff_sees_system_settings_only() {
    let body = body_text(get(app(), "/", Some("staff-token")).await).await;

    assert!(body.contains(r#"data-key="system""#));
    assert!(body.contains(r#"data-key="system.settings""#));
    assert!(!body.contains(r#"data-key="system.admin""#));
}

#[tokio::test]
async fn test_superuser_sees_administration() {
    let body = body_text(get(app(), "/", Some("root-token")).await).await;

    assert!(body.contains(r#"data-key="system.admin""#));
    assert!(body.contains(r#"href="/admin/""#));
    assert!(body.contains(r#"data-key="financial""#));
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_temp_page_title_from_path() {
    let response = get(app(), "/temp/sales/list/", Some("user-token")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("<title>Sales List</title>"));
}

#[tokio::test]
async fn test_profile_page_shows_recent_logins() {
    let response = get(app(), "/accounts/profile/", Some("user-token")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("maria@example.com"));
    assert!(body.contains("203.0.113.7"));
}

#[tokio::test]
async fn test_health_reports_database() {
    let response = get(app(), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app_with_database(false), "/health", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}

// =============================================================================
// Login, logout, registration
// =============================================================================

#[tokio::test]
async fn test_login_sets_session_and_follows_next() {
    let response = post_form(
        app(),
        "/accounts/login/",
        "username=maria&password=correct-password&next=%2Faccounts%2Fprofile%2F",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/profile/");

    let cookies = set_cookies(&response);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("sessionid=user-token"))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(!session.contains("Max-Age"));
}

#[tokio::test]
async fn test_login_remember_me_persists_cookie() {
    let response = post_form(
        app(),
        "/accounts/login/",
        "username=maria&password=correct-password&remember_me=on",
    )
    .await;

    assert_eq!(location(&response), "/");
    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("sessionid=") && c.contains("Max-Age=3600")));
}

#[tokio::test]
async fn test_login_ignores_foreign_next() {
    let response = post_form(
        app(),
        "/accounts/login/",
        "username=maria&password=correct-password&next=%2F%2Fevil.example%2F",
    )
    .await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_wrong_password_rerenders() {
    let response = post_form(app(), "/accounts/login/", "username=maria&password=nope").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)
        .iter()
        .all(|c| !c.starts_with("sessionid=")));

    let body = body_text(response).await;
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains(r#"value="maria""#));
}

#[tokio::test]
async fn test_login_page_redirects_when_logged_in() {
    let response = get(app(), "/accounts/login/", Some("user-token")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/logout/")
                .header(header::COOKIE, "sessionid=user-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("sessionid=") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let response = post_form(
        app(),
        "/accounts/register/",
        "username=maria&first_name=Maria&last_name=Silva&email=other%40example.com\
         &password1=correct-horse&password2=correct-horse",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("A user with that username already exists."));
}

#[tokio::test]
async fn test_register_success_redirects_to_login() {
    let response = post_form(
        app(),
        "/accounts/register/",
        "username=novo&first_name=Novo&last_name=Usuario&email=novo%40example.com\
         &password1=correct-horse&password2=correct-horse",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");
}

#[tokio::test]
async fn test_password_change_wrong_old_password() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/password/change/")
                .header(header::COOKIE, "sessionid=user-token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "old_password=wrong&new_password1=another-pass&new_password2=another-pass",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Your old password was entered incorrectly."));
}

async fn post_form_as(app: Router, uri: &str, token: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, format!("sessionid={}", token))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_login_next_with_newline_falls_back_to_dashboard() {
    let response = post_form(
        app(),
        "/accounts/login/",
        "username=maria&password=correct-password&next=%2Fa%0Ab",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("sessionid=user-token")));
}

#[tokio::test]
async fn test_login_next_with_tab_is_not_followed() {
    let response = post_form(
        app(),
        "/accounts/login/",
        "username=maria&password=correct-password&next=%2F%09%2Fevil.example%2F",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_session_from_before_password_change_is_anonymous() {
    let response = get(app(), "/accounts/profile/", Some("stale-token")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/?next="));
}

#[tokio::test]
async fn test_register_blank_names_rerenders() {
    let response = post_form(
        app(),
        "/accounts/register/",
        "username=novo&first_name=%20%20%20&last_name=%09&email=novo%40example.com\
         &password1=correct-horse&password2=correct-horse",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
}

#[tokio::test]
async fn test_password_change_keeps_remembered_session() {
    let response = post_form_as(
        app(),
        "/accounts/password/change/",
        "remembered-token",
        "old_password=correct-password&new_password1=another-pass&new_password2=another-pass",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/profile/");
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("sessionid=") && c.contains("Max-Age=3600")));
}

#[tokio::test]
async fn test_password_change_keeps_browser_session() {
    let response = post_form_as(
        app(),
        "/accounts/password/change/",
        "user-token",
        "old_password=correct-password&new_password1=another-pass&new_password2=another-pass",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let session = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("sessionid="))
        .unwrap();
    assert!(!session.contains("Max-Age"));
}
