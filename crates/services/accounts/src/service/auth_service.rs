//! Authentication service - registration, login, session tokens and
//! password changes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};
use domain::password::DUMMY_HASH;
use domain::{NewLoginRecord, NewUser, Password, User, SECONDS_PER_HOUR};

use crate::repository::{LoginHistoryRepository, UserRepository};

/// Session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    /// Fingerprint of the password hash the token was issued for
    #[serde(default)]
    pub pwd: Option<String>,
    /// Whether the session cookie outlives the browser session
    #[serde(default)]
    pub remember: bool,
}

impl Claims {
    /// A token stops being current once its user changes password.
    pub fn is_current_for(&self, user: &User) -> bool {
        self.sub == user.id
            && self.pwd == Password::from_hash(user.password_hash.clone()).fingerprint()
    }
}

/// Signed session token issued after a successful login
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub remember: bool,
    pub user: User,
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Login input with the request details kept in the login history
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    /// Username or email address
    pub identifier: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub remember: bool,
}

/// Password change input
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    /// Carried over from the current session
    pub remember: bool,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; its profile starts out empty until first saved
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Verify credentials, record the login and issue a session token
    async fn login(&self, attempt: LoginAttempt) -> AppResult<SessionToken>;

    /// Verify a session token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Replace the password after checking the old one; returns a fresh
    /// token so the current session survives while tokens issued for the
    /// old password stop being current
    async fn change_password(&self, user_id: Uuid, change: PasswordChange)
        -> AppResult<SessionToken>;
}

/// Issue a session token for a user
fn generate_token(user: User, remember: bool, config: &JwtConfig) -> AppResult<SessionToken> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        pwd: Password::from_hash(user.password_hash.clone()).fingerprint(),
        remember,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )?;

    Ok(SessionToken {
        token,
        expires_in: config.expiration_hours * SECONDS_PER_HOUR,
        remember,
        user,
    })
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    history: Arc<dyn LoginHistoryRepository>,
    config: JwtConfig,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        history: Arc<dyn LoginHistoryRepository>,
        config: JwtConfig,
    ) -> Self {
        Self {
            users,
            history,
            config,
        }
    }

    /// An identifier containing '@' is tried as an email when no account
    /// has it as username.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        if let Some(user) = self.users.find_by_username(identifier).await? {
            return Ok(Some(user));
        }
        if identifier.contains('@') {
            return self.users.find_by_email(identifier).await;
        }
        Ok(None)
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        // Field formats are validated by the form layer
        if self
            .users
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }
        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                is_staff: false,
                is_superuser: false,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "account registered");
        Ok(user)
    }

    async fn login(&self, attempt: LoginAttempt) -> AppResult<SessionToken> {
        let user = self.find_by_identifier(attempt.identifier.trim()).await?;

        // Verify against a dummy hash when the account is unknown so both
        // failure paths take the same time.
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(hash).verify(&attempt.password);

        let user = match user {
            Some(user) if password_valid && user.is_active => user,
            _ => {
                warn!(identifier = %attempt.identifier, "failed login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        self.users.touch_last_login(user.id, now).await?;
        self.history
            .record(NewLoginRecord {
                user_id: user.id,
                ip_address: attempt.ip_address,
                user_agent: attempt.user_agent,
            })
            .await?;

        info!(user_id = %user.id, "user logged in");
        generate_token(
            User {
                last_login: Some(now),
                ..user
            },
            attempt.remember,
            &self.config,
        )
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        change: PasswordChange,
    ) -> AppResult<SessionToken> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !Password::from_hash(user.password_hash.clone()).verify(&change.old_password) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = Password::new(&change.new_password)?.into_string();
        self.users.set_password(user.id, password_hash.clone()).await?;

        info!(user_id = %user.id, "password changed");
        generate_token(
            User {
                password_hash,
                ..user
            },
            change.remember,
            &self.config,
        )
    }
}
