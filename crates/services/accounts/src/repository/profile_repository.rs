//! Profile repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user_profile::{self, ActiveModel, Entity as ProfileEntity};
use common::AppResult;
use domain::{ProfileUpdate, UserProfile};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Apply the update, creating the profile first when it is missing
    async fn upsert(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile>;
}

pub struct ProfileStore {
    db: DatabaseConnection,
}

impl ProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply(active: &mut ActiveModel, update: ProfileUpdate) {
    active.role = Set(update.role.as_str().to_string());
    active.phone = Set(update.phone);
    active.department = Set(update.department);
    active.bio = Set(update.bio);
    active.birth_date = Set(update.birth_date);
    active.address = Set(update.address);
    active.city = Set(update.city);
    active.state = Set(update.state);
    active.zip_code = Set(update.zip_code);
    active.updated_at = Set(Utc::now());
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let result = ProfileEntity::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(result.map(UserProfile::from))
    }

    async fn upsert(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile> {
        let existing = ProfileEntity::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                apply(&mut active, update);
                active.update(&self.db).await?
            }
            None => {
                tracing::warn!(%user_id, "profile missing, creating it");
                let now = Utc::now();
                let mut active = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    avatar: Set(None),
                    created_at: Set(now),
                    ..Default::default()
                };
                apply(&mut active, update);
                active.insert(&self.db).await?
            }
        };

        Ok(UserProfile::from(model))
    }
}
