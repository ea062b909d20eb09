//! Permissions and the viewer capability.
//!
//! Permission identifiers are codenames of the form `app.action_model`,
//! e.g. `sales.view_sale`.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::user::User;

/// What a consumer needs to know about the person viewing a page.
pub trait Viewer {
    /// Whether the viewer holds the given permission
    fn has_perm(&self, permission: &str) -> bool;

    fn is_staff(&self) -> bool;

    fn is_superuser(&self) -> bool;
}

/// Check the `app.action_model` codename shape.
pub fn is_valid_permission(codename: &str) -> bool {
    match codename.split_once('.') {
        Some((app, action_model)) => {
            let valid_part = |part: &str| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            };
            valid_part(app)
                && valid_part(action_model)
                && action_model
                    .split_once('_')
                    .is_some_and(|(action, model)| !action.is_empty() && !model.is_empty())
        }
        None => false,
    }
}

/// An authenticated account together with its granted permissions.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user: User,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn new(user: User, permissions: BTreeSet<String>) -> Self {
        Self { user, permissions }
    }
}

impl Viewer for Principal {
    /// Inactive accounts hold nothing; active superusers hold everything.
    fn has_perm(&self, permission: &str) -> bool {
        if !self.user.is_active {
            return false;
        }
        self.user.is_superuser || self.permissions.contains(permission)
    }

    fn is_staff(&self) -> bool {
        self.user.is_active && self.user.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.user.is_active && self.user.is_superuser
    }
}

/// A visitor who is not logged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Viewer for Anonymous {
    fn has_perm(&self, _permission: &str) -> bool {
        false
    }

    fn is_staff(&self) -> bool {
        false
    }

    fn is_superuser(&self) -> bool {
        false
    }
}
