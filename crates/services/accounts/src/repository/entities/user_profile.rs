//! User profile database entity.

use sea_orm::entity::prelude::*;

use domain::{ProfileRole, UserProfile};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub avatar: Option<String>,
    pub role: String,
    pub phone: String,
    pub department: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub birth_date: Option<Date>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        UserProfile {
            id: model.id,
            user_id: model.user_id,
            avatar: model.avatar,
            role: ProfileRole::from(model.role.as_str()),
            phone: model.phone,
            department: model.department,
            bio: model.bio,
            birth_date: model.birth_date,
            address: model.address,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
