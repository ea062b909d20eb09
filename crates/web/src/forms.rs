//! HTML form payloads and their validation.
//!
//! Field rules live on the structs as `validator` attributes. Rules that
//! need the database (unique username or email) are checked by the services
//! and merged into the same [`FormErrors`] so the template can show every
//! problem next to its field.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use domain::{AccountUpdate, DomainError, Password, ProfileRole, ProfileUpdate, User, UserProfile};

/// Letters, digits and `@ . + - _`.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex literal"));

const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Field name to messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut form = Self::default();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form.add(&field, message);
            }
        }
        form
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// Run the derived rules.
pub fn check<T: Validate>(form: &T) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::default(),
        Err(errors) => FormErrors::from_validation(&errors),
    }
}

/// Unchecked boxes are absent from the body; checked ones send `on`.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref(),
        Some("on" | "true" | "1" | "yes")
    ))
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username").with_message(INVALID_USERNAME.into()))
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    Password::check_strength(password).map_err(|e| {
        let message = match e {
            DomainError::Password(message) => message,
            other => other.to_string(),
        };
        ValidationError::new("weak_password").with_message(message.into())
    })
}

fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_date").with_message("Enter a valid date.".into()))
}

/// Blank means no date.
fn parse_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some)
}

// =============================================================================
// Authentication
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    /// Username or email address
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub username: String,

    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default, skip_serializing)]
    pub password: String,

    #[serde(default, deserialize_with = "checkbox")]
    pub remember_me: bool,

    /// Page to continue to after logging in
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct RegisterForm {
    #[validate(
        length(min = 1, max = 150, message = "Enter a username of at most 150 characters."),
        custom(function = "validate_username")
    )]
    #[serde(default)]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "This field is required."))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "This field is required."))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    #[serde(default, skip_serializing)]
    pub password1: String,

    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl RegisterForm {
    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }

    /// Expects a [`trimmed`](Self::trimmed) form.
    pub fn errors(&self) -> FormErrors {
        let mut errors = check(self);
        if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PasswordChangeForm {
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub old_password: String,

    #[validate(custom(function = "validate_password"))]
    #[serde(default)]
    pub new_password1: String,

    #[serde(default)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    pub fn errors(&self) -> FormErrors {
        let mut errors = check(self);
        if self.new_password1 != self.new_password2 {
            errors.add("new_password2", PASSWORD_MISMATCH);
        }
        errors
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Account and profile fields submitted together from the edit page.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProfileEditForm {
    #[validate(
        length(min = 1, max = 150, message = "Enter a username of at most 150 characters."),
        custom(function = "validate_username")
    )]
    #[serde(default)]
    pub username: String,

    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: String,

    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    #[serde(default)]
    pub phone: String,

    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub bio: String,

    #[validate(custom(function = "validate_birth_date"))]
    #[serde(default)]
    pub birth_date: String,

    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    #[serde(default)]
    pub address: String,

    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    #[serde(default)]
    pub city: String,

    #[validate(length(max = 2, message = "Ensure this value has at most 2 characters."))]
    #[serde(default)]
    pub state: String,

    #[validate(length(max = 10, message = "Ensure this value has at most 10 characters."))]
    #[serde(default)]
    pub zip_code: String,
}

impl ProfileEditForm {
    /// Prefill from the stored account and profile.
    pub fn from_existing(user: &User, profile: &UserProfile) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: profile.role.as_str().to_string(),
            phone: profile.phone.clone(),
            department: profile.department.clone(),
            bio: profile.bio.clone(),
            birth_date: profile
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            address: profile.address.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            zip_code: profile.zip_code.clone(),
        }
    }

    pub fn errors(&self) -> FormErrors {
        let mut errors = check(self);
        if ProfileRole::parse(&self.role).is_none() {
            errors.add(
                "role",
                "Select a valid choice. That choice is not one of the available choices.",
            );
        }
        errors
    }

    pub fn account(&self) -> AccountUpdate {
        AccountUpdate {
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Only meaningful once [`errors`](Self::errors) came back empty.
    pub fn profile(&self) -> ProfileUpdate {
        ProfileUpdate {
            role: ProfileRole::from(self.role.as_str()),
            phone: self.phone.trim().to_string(),
            department: self.department.trim().to_string(),
            bio: self.bio.clone(),
            birth_date: parse_date(&self.birth_date).ok().flatten(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        }
    }
}

/// Directory search and page selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserSearch {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl UserSearch {
    /// Trimmed search text, `None` when blank
    pub fn query(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
    }
}

/// Local redirect target from a `next` parameter.
///
/// Only same-site absolute paths made of visible ASCII are accepted.
/// Browsers drop tabs and newlines, so `/\t/host` reads as `//host`.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    next.map(str::trim)
        .filter(|n| {
            n.starts_with('/')
                && !n.starts_with("//")
                && n.chars().all(|c| c.is_ascii_graphic() && c != '\\')
        })
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &str = "This field is required.";

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "maria.silva".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Silva".to_string(),
            email: "maria@example.com".to_string(),
            password1: "correct-horse".to_string(),
            password2: "correct-horse".to_string(),
        }
    }

    #[test]
    fn test_register_form_valid() {
        assert!(register_form().errors().is_empty());
    }

    #[test]
    fn test_register_form_blank_names_required() {
        let form = RegisterForm {
            first_name: "   ".to_string(),
            last_name: "\t".to_string(),
            ..register_form()
        }
        .trimmed();

        let errors = form.errors();
        assert_eq!(errors.get("first_name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("last_name"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_register_form_trimmed() {
        let form = RegisterForm {
            username: " maria.silva ".to_string(),
            email: " maria@example.com\n".to_string(),
            ..register_form()
        }
        .trimmed();

        assert_eq!(form.username, "maria.silva");
        assert_eq!(form.email, "maria@example.com");
        assert_eq!(form.password1, "correct-horse");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_register_form_rejects_bad_username() {
        let form = RegisterForm {
            username: "maria silva!".to_string(),
            ..register_form()
        };
        assert!(form.errors().get("username").is_some());
    }

    #[test]
    fn test_register_form_password_mismatch() {
        let form = RegisterForm {
            password2: "something-else".to_string(),
            ..register_form()
        };
        assert_eq!(
            form.errors().get("password2"),
            Some(&[PASSWORD_MISMATCH.to_string()][..])
        );
    }

    #[test]
    fn test_register_form_numeric_password() {
        let form = RegisterForm {
            password1: "12345678".to_string(),
            password2: "12345678".to_string(),
            ..register_form()
        };
        assert!(form.errors().get("password1").is_some());
    }

    #[test]
    fn test_register_form_requires_names() {
        let form = RegisterForm {
            first_name: String::new(),
            ..register_form()
        };
        assert_eq!(
            form.errors().get("first_name"),
            Some(&[REQUIRED.to_string()][..])
        );
    }

    #[test]
    fn test_profile_form_birth_date() {
        let mut form = ProfileEditForm {
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            role: "manager".to_string(),
            ..Default::default()
        };
        assert!(form.errors().is_empty());
        assert_eq!(form.profile().birth_date, None);

        form.birth_date = "1990-02-30".to_string();
        assert!(form.errors().get("birth_date").is_some());

        form.birth_date = "1990-02-28".to_string();
        assert_eq!(
            form.profile().birth_date,
            NaiveDate::from_ymd_opt(1990, 2, 28)
        );
    }

    #[test]
    fn test_profile_form_rejects_unknown_role_and_long_state() {
        let form = ProfileEditForm {
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            role: "owner".to_string(),
            state: "SPX".to_string(),
            ..Default::default()
        };
        let errors = form.errors();
        assert!(errors.get("role").is_some());
        assert!(errors.get("state").is_some());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/accounts/users/")), Some("/accounts/users/".to_string()));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_safe_next_rejects_embedded_whitespace() {
        assert_eq!(safe_next(Some("/a\nb")), None);
        assert_eq!(safe_next(Some("/\t/evil.example/")), None);
        assert_eq!(safe_next(Some("/ /evil.example/")), None);
        assert_eq!(safe_next(Some("/caf\u{e9}/")), None);
        assert_eq!(
            safe_next(Some(" /temp/sales/list/?page=2 ")),
            Some("/temp/sales/list/?page=2".to_string())
        );
    }

    #[test]
    fn test_search_query_blank() {
        let search = UserSearch {
            search: Some("   ".to_string()),
            page: None,
        };
        assert_eq!(search.query(), None);
    }
}
