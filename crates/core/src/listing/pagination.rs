//! Fixed-size page pagination for counted result sets, plus the
//! limit/offset clamps used by plain list endpoints.

use serde::Serialize;

/// Rows per page for paginated part listings.
pub const PAGE_SIZE: usize = 50;

/// Default `limit` for limit/offset list endpoints.
pub const DEFAULT_LIMIT: i64 = 100;

/// Maximum `limit` for limit/offset list endpoints.
pub const MAX_LIMIT: i64 = 500;

/// One page of results with the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Position of one page within a result set of known size.
///
/// Pages are 1-based. Missing or zero pages give the first page; pages past
/// the end give the last page. An empty result is a single empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl PageWindow {
    pub fn new(total: usize, page: Option<usize>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.unwrap_or(1).clamp(1, total_pages);
        Self {
            page,
            page_size,
            total,
            total_pages,
        }
    }

    /// Rows to skip before this page, for `OFFSET`.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.page_size) as i64
    }

    /// Rows on a full page, for `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn with_items<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
