//! Login history repository. Records are only ever appended.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::login_history::{self, ActiveModel, Entity as LoginEntity};
use super::entities::user::Entity as UserEntity;
use common::AppResult;
use domain::{LoginActivity, LoginRecord, NewLoginRecord};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LoginHistoryRepository: Send + Sync {
    async fn record(&self, entry: NewLoginRecord) -> AppResult<LoginRecord>;

    /// Newest first
    async fn recent_for_user(&self, user_id: Uuid, limit: u64) -> AppResult<Vec<LoginRecord>>;

    /// Newest first, across all accounts
    async fn recent(&self, limit: u64) -> AppResult<Vec<LoginActivity>>;
}

pub struct LoginHistoryStore {
    db: DatabaseConnection,
}

impl LoginHistoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginHistoryRepository for LoginHistoryStore {
    async fn record(&self, entry: NewLoginRecord) -> AppResult<LoginRecord> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(entry.user_id),
            login_time: Set(Utc::now()),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
        }
        .insert(&self.db)
        .await?;

        Ok(LoginRecord::from(model))
    }

    async fn recent_for_user(&self, user_id: Uuid, limit: u64) -> AppResult<Vec<LoginRecord>> {
        let models = LoginEntity::find()
            .filter(login_history::Column::UserId.eq(user_id))
            .order_by_desc(login_history::Column::LoginTime)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(LoginRecord::from).collect())
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<LoginActivity>> {
        let rows = LoginEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(login_history::Column::LoginTime)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(record, user)| LoginActivity {
                username: user.map(|u| u.username).unwrap_or_default(),
                record: LoginRecord::from(record),
            })
            .collect())
    }
}
