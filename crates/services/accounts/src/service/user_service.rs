//! User service - account lookup, directory, profile and permission
//! management.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Paginated, PaginationParams};
use domain::{
    is_valid_permission, AccountUpdate, LoginActivity, LoginRecord, NewUser, Password, Principal,
    ProfileUpdate, User, UserCounts, UserProfile,
};

use crate::repository::{LoginHistoryRepository, ProfileRepository, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Load an active account with its permissions for request handling.
    ///
    /// Inactive or deleted accounts yield `Unauthorized`.
    async fn load_principal(&self, id: Uuid) -> AppResult<Principal>;

    /// Directory search, ordered by username. The page is clamped to the
    /// available range.
    async fn search_users(
        &self,
        query: Option<String>,
        params: PaginationParams,
        per_page: u64,
    ) -> AppResult<Paginated<User>>;

    /// Update the account fields; the username must stay unique
    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<User>;

    /// The user's profile, or an empty default one when none exists yet
    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile>;

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile>;

    async fn recent_logins(&self, user_id: Uuid, limit: u64) -> AppResult<Vec<LoginRecord>>;

    async fn recent_activity(&self, limit: u64) -> AppResult<Vec<LoginActivity>>;

    async fn user_counts(&self) -> AppResult<UserCounts>;

    /// Create an active staff superuser
    async fn create_superuser(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User>;

    async fn grant_permission(&self, username: &str, codename: &str) -> AppResult<()>;

    async fn set_staff(&self, username: &str, is_staff: bool) -> AppResult<User>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    history: Arc<dyn LoginHistoryRepository>,
}

impl UserManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        history: Arc<dyn LoginHistoryRepository>,
    ) -> Self {
        Self {
            users,
            profiles,
            history,
        }
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.users.find_by_username(username).await?.ok_or_not_found()
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn load_principal(&self, id: Uuid) -> AppResult<Principal> {
        let user = match self.users.find_by_id(id).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AppError::Unauthorized),
        };
        let permissions = self.users.permissions_for(user.id).await?;
        Ok(Principal::new(user, permissions))
    }

    async fn search_users(
        &self,
        query: Option<String>,
        params: PaginationParams,
        per_page: u64,
    ) -> AppResult<Paginated<User>> {
        let total = self.users.count_matching(query.clone()).await?;
        let page = params.clamp(total, per_page);
        let users = self
            .users
            .search(query, PaginationParams::offset(page, per_page), per_page)
            .await?;

        Ok(Paginated::new(users, page, per_page, total))
    }

    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<User> {
        if let Some(other) = self.users.find_by_username(&update.username).await? {
            if other.id != id {
                return Err(AppError::conflict("Username"));
            }
        }
        let user = self.users.update_account(id, update).await?;
        info!(user_id = %user.id, "account updated");
        Ok(user)
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        Ok(self
            .profiles
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::empty(user_id)))
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile> {
        self.profiles.upsert(user_id, update).await
    }

    async fn recent_logins(&self, user_id: Uuid, limit: u64) -> AppResult<Vec<LoginRecord>> {
        self.history.recent_for_user(user_id, limit).await
    }

    async fn recent_activity(&self, limit: u64) -> AppResult<Vec<LoginActivity>> {
        self.history.recent(limit).await
    }

    async fn user_counts(&self) -> AppResult<UserCounts> {
        self.users.counts().await
    }

    async fn create_superuser(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                first_name: String::new(),
                last_name: String::new(),
                is_staff: true,
                is_superuser: true,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "superuser created");
        Ok(user)
    }

    async fn grant_permission(&self, username: &str, codename: &str) -> AppResult<()> {
        if !is_valid_permission(codename) {
            return Err(AppError::validation(format!(
                "Invalid permission '{}', expected app.action_model",
                codename
            )));
        }
        let user = self.get_by_username(username).await?;
        self.users
            .grant_permission(user.id, codename.to_string())
            .await?;

        info!(user_id = %user.id, permission = codename, "permission granted");
        Ok(())
    }

    async fn set_staff(&self, username: &str, is_staff: bool) -> AppResult<User> {
        let user = self.get_by_username(username).await?;
        let user = self.users.set_flags(user.id, Some(is_staff), None).await?;
        info!(user_id = %user.id, is_staff, "staff flag changed");
        Ok(user)
    }
}
