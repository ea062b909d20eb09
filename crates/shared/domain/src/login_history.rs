//! Login history records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One successful login. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login_time: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// Data captured from the request at login time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLoginRecord {
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// A login record joined with the account's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginActivity {
    pub username: String,
    #[serde(flatten)]
    pub record: LoginRecord,
}
