//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! accounts, profiles, login history, permissions and the navigation menu.

pub mod constants;
pub mod error;
pub mod i18n;
pub mod login_history;
pub mod menu;
pub mod password;
pub mod permission;
pub mod profile;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use i18n::{Catalog, Translator};
pub use login_history::{LoginActivity, LoginRecord, NewLoginRecord};
pub use menu::{
    build_menu, has_permission, is_active, render_menu, visible_children, MenuEntry, MenuNode,
    RouteResolver,
};
pub use password::Password;
pub use permission::{is_valid_permission, Anonymous, Principal, Viewer};
pub use profile::{ProfileRole, ProfileUpdate, UserProfile};
pub use user::{AccountUpdate, NewUser, User, UserCounts};
