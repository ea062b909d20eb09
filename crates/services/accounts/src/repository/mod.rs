//! Repository layer for data access.

pub mod entities;
mod login_history_repository;
mod profile_repository;
mod user_repository;

pub use login_history_repository::{LoginHistoryRepository, LoginHistoryStore};
pub use profile_repository::{ProfileRepository, ProfileStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use login_history_repository::MockLoginHistoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use profile_repository::MockProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
