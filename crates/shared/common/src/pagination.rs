//! Pagination types for list pages.

use serde::{Deserialize, Serialize};

/// Requested page of a listing.
///
/// `page` is kept as raw text so malformed values fall back to the first
/// page instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<String>,
}

impl PaginationParams {
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page.to_string()),
        }
    }

    /// Requested page number; anything unparsable or below one is page 1.
    pub fn requested(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }

    /// Requested page clamped to the last page for `total` items.
    ///
    /// An empty listing still has a first page.
    pub fn clamp(&self, total: u64, per_page: u64) -> u64 {
        let last = total_pages(total, per_page).max(1);
        self.requested().min(last)
    }

    /// Row offset of a (clamped) page
    pub fn offset(page: u64, per_page: u64) -> u64 {
        page.saturating_sub(1) * per_page
    }
}

fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page > 0 {
        total.div_ceil(per_page)
    } else {
        0
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = total_pages(total, per_page);

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
                has_previous: page > 1,
                has_next: page < total_pages,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &str) -> PaginationParams {
        PaginationParams {
            page: Some(raw.to_string()),
        }
    }

    #[test]
    fn test_invalid_page_is_first_page() {
        assert_eq!(params("abc").requested(), 1);
        assert_eq!(params("0").requested(), 1);
        assert_eq!(params("-3").requested(), 1);
        assert_eq!(PaginationParams::default().requested(), 1);
    }

    #[test]
    fn test_page_beyond_end_is_last_page() {
        assert_eq!(params("9").clamp(25, 10), 3);
        assert_eq!(params("2").clamp(25, 10), 2);
    }

    #[test]
    fn test_empty_listing_has_first_page() {
        assert_eq!(params("4").clamp(0, 10), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PaginationParams::offset(1, 10), 0);
        assert_eq!(PaginationParams::offset(3, 10), 20);
    }

    #[test]
    fn test_meta() {
        let page = Paginated::new(vec![1, 2, 3], 2, 10, 23);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.meta.has_previous);
        assert!(page.meta.has_next);

        let last = Paginated::new(vec![1], 3, 10, 23);
        assert!(!last.meta.has_next);
    }
}
