//! User repository implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, OnConflict},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::{user_permission, user_profile};
use common::{AppError, AppResult};
use domain::{AccountUpdate, NewUser, User, UserCounts, ROLE_USER};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Exact, case-sensitive username match
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Case-insensitive email match; the first account by username wins
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create the account together with its default profile
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<User>;

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Change the staff and/or superuser flags; `None` leaves a flag as is
    async fn set_flags(
        &self,
        id: Uuid,
        is_staff: Option<bool>,
        is_superuser: Option<bool>,
    ) -> AppResult<User>;

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Page of accounts matching the search, ordered by username
    async fn search(&self, query: Option<String>, offset: u64, limit: u64) -> AppResult<Vec<User>>;

    /// Number of accounts matching the search
    async fn count_matching(&self, query: Option<String>) -> AppResult<u64>;

    async fn counts(&self) -> AppResult<UserCounts>;

    async fn permissions_for(&self, id: Uuid) -> AppResult<BTreeSet<String>>;

    /// Grant a permission; granting twice is a no-op
    async fn grant_permission(&self, id: Uuid, codename: String) -> AppResult<()>;
}

/// Case-insensitive substring match on username, first name, last name or
/// email. A blank query matches everything.
fn search_condition(query: Option<&str>) -> Condition {
    let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Condition::all();
    };
    let pattern = format!("%{}%", escape_like(&q.to_lowercase()));

    [
        user::Column::Username,
        user::Column::FirstName,
        user::Column::LastName,
        user::Column::Email,
    ]
    .into_iter()
    .fold(Condition::any(), |cond, column| {
        cond.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
    })
}

/// Escape LIKE wildcards so they match literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .order_by_asc(user::Column::Username)
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let model = ActiveModel {
            id: Set(user_id),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            is_active: Set(true),
            is_staff: Set(new_user.is_staff),
            is_superuser: Set(new_user.is_superuser),
            last_login: Set(None),
            date_joined: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            avatar: Set(None),
            role: Set(ROLE_USER.to_string()),
            phone: Set(String::new()),
            department: Set(String::new()),
            bio: Set(String::new()),
            birth_date: Set(None),
            address: Set(String::new()),
            city: Set(String::new()),
            state: Set(String::new()),
            zip_code: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(User::from(model))
    }

    async fn update_account(&self, id: Uuid, update: AccountUpdate) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.username = Set(update.username);
        active.first_name = Set(update.first_name);
        active.last_name = Set(update.last_name);
        active.email = Set(update.email);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn set_flags(
        &self,
        id: Uuid,
        is_staff: Option<bool>,
        is_superuser: Option<bool>,
    ) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        if let Some(staff) = is_staff {
            active.is_staff = Set(staff);
        }
        if let Some(superuser) = is_superuser {
            active.is_superuser = Set(superuser);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Some(at)))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: Option<String>, offset: u64, limit: u64) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(search_condition(query.as_deref()))
            .order_by_asc(user::Column::Username)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count_matching(&self, query: Option<String>) -> AppResult<u64> {
        let total = UserEntity::find()
            .filter(search_condition(query.as_deref()))
            .count(&self.db)
            .await?;
        Ok(total)
    }

    async fn counts(&self) -> AppResult<UserCounts> {
        let total = UserEntity::find().count(&self.db).await?;
        let staff = UserEntity::find()
            .filter(user::Column::IsStaff.eq(true))
            .count(&self.db)
            .await?;
        let superusers = UserEntity::find()
            .filter(user::Column::IsSuperuser.eq(true))
            .count(&self.db)
            .await?;

        Ok(UserCounts {
            total,
            staff,
            superusers,
        })
    }

    async fn permissions_for(&self, id: Uuid) -> AppResult<BTreeSet<String>> {
        let grants = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(id))
            .all(&self.db)
            .await?;

        Ok(grants.into_iter().map(|g| g.codename).collect())
    }

    async fn grant_permission(&self, id: Uuid, codename: String) -> AppResult<()> {
        let grant = user_permission::ActiveModel {
            user_id: Set(id),
            codename: Set(codename),
        };

        user_permission::Entity::insert(grant)
            .on_conflict(
                OnConflict::columns([
                    user_permission::Column::UserId,
                    user_permission::Column::Codename,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("ana"), "ana");
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(search_condition(None).is_empty());
        assert!(search_condition(Some("   ")).is_empty());
        assert_eq!(search_condition(Some("ana")).len(), 4);
    }
}
