//! User profile: the per-account extension holding contact and role data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_GUEST, ROLE_MANAGER, ROLE_SUPERVISOR, ROLE_USER};

/// Organisational role shown on a profile.
///
/// Display only; authorization is driven by permissions and account flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    Admin,
    Manager,
    Supervisor,
    #[default]
    User,
    Guest,
}

impl ProfileRole {
    /// Every role, in display order
    pub const ALL: [ProfileRole; 5] = [
        ProfileRole::Admin,
        ProfileRole::Manager,
        ProfileRole::Supervisor,
        ProfileRole::User,
        ProfileRole::Guest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileRole::Admin => ROLE_ADMIN,
            ProfileRole::Manager => ROLE_MANAGER,
            ProfileRole::Supervisor => ROLE_SUPERVISOR,
            ProfileRole::User => ROLE_USER,
            ProfileRole::Guest => ROLE_GUEST,
        }
    }

    /// Human readable label (a translation msgid)
    pub fn label(&self) -> &'static str {
        match self {
            ProfileRole::Admin => "Administrator",
            ProfileRole::Manager => "Manager",
            ProfileRole::Supervisor => "Supervisor",
            ProfileRole::User => "User",
            ProfileRole::Guest => "Guest",
        }
    }

    /// Bootstrap contextual colour used for the role badge
    pub fn badge(&self) -> &'static str {
        match self {
            ProfileRole::Admin => "danger",
            ProfileRole::Manager => "primary",
            ProfileRole::Supervisor => "warning",
            ProfileRole::User => "success",
            ProfileRole::Guest => "secondary",
        }
    }

    /// Parse a stored role, returning `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl From<&str> for ProfileRole {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile entity, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Relative path of an uploaded avatar, if any
    pub avatar: Option<String>,
    pub role: ProfileRole,
    pub phone: String,
    pub department: String,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile with the default role.
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            avatar: None,
            role: ProfileRole::default(),
            phone: String::new(),
            department: String::new(),
            bio: String::new(),
            birth_date: None,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub role: ProfileRole,
    pub phone: String,
    pub department: String,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_badges() {
        assert_eq!(ProfileRole::Admin.badge(), "danger");
        assert_eq!(ProfileRole::Manager.badge(), "primary");
        assert_eq!(ProfileRole::Supervisor.badge(), "warning");
        assert_eq!(ProfileRole::User.badge(), "success");
        assert_eq!(ProfileRole::Guest.badge(), "secondary");
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        assert_eq!(ProfileRole::from("owner"), ProfileRole::User);
        assert_eq!(ProfileRole::parse("owner"), None);
        assert_eq!(ProfileRole::from("manager"), ProfileRole::Manager);
    }

    #[test]
    fn test_empty_profile_has_default_role() {
        let profile = UserProfile::empty(Uuid::new_v4());
        assert_eq!(profile.role, ProfileRole::User);
        assert!(profile.birth_date.is_none());
    }
}
