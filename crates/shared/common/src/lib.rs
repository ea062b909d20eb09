//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling with HTML error responses
//! - Pagination types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod pagination;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
