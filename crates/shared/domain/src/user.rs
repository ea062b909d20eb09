//! User account entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Inactive accounts cannot log in and hold no permissions
    pub is_active: bool,
    /// May use the user directory and sees the System menu
    pub is_staff: bool,
    /// Implicitly holds every permission
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active, unprivileged account
    pub fn new(
        id: Uuid,
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            password_hash,
            first_name,
            last_name,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: now,
            updated_at: now,
        }
    }

    /// First and last name separated by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name, or the username when no name is set.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    /// Staff or superuser.
    pub fn can_manage_users(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Data required to create an account (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Editable account fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Account totals shown on the administration index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub total: u64,
    pub staff: u64,
    pub superusers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "jdoe".to_string(),
            "jdoe@example.com".to_string(),
            "hash".to_string(),
            first.to_string(),
            last.to_string(),
        )
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user("John", "Doe").display_name(), "John Doe");
        assert_eq!(user("John", "").display_name(), "John");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(user("", "").display_name(), "jdoe");
    }

    #[test]
    fn test_new_user_is_unprivileged() {
        let u = user("John", "Doe");
        assert!(u.is_active);
        assert!(!u.can_manage_users());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user("John", "Doe")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "jdoe");
    }
}
