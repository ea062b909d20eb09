//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Profile Roles
// =============================================================================

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SUPERVISOR: &str = "supervisor";

/// Default role assigned to new profiles
pub const ROLE_USER: &str = "user";

pub const ROLE_GUEST: &str = "guest";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24 * 14;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

// =============================================================================
// Listings
// =============================================================================

/// Users shown per page in the staff directory
pub const USER_LIST_PAGE_SIZE: u64 = 10;

/// Login records shown on the owner's profile page
pub const PROFILE_RECENT_LOGINS: u64 = 5;

/// Login records shown on the staff user detail page
pub const DETAIL_RECENT_LOGINS: u64 = 10;

/// Login records shown on the administration index
pub const ADMIN_RECENT_LOGINS: u64 = 20;

// =============================================================================
// Menu
// =============================================================================

/// Icon used when a menu node does not declare one
pub const DEFAULT_MENU_ICON: &str = "bi bi-circle";
