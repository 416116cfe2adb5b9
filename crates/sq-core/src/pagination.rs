//! Pagination state
//!
//! Page numbers are 1-indexed. After every mutator `offset == (page - 1) * limit`.
//! `total` is reported by the remote API and never derived.
//!
//! The setters apply the formula as-is: a page or limit below 1 is stored and
//! the offset follows (possibly negative). Callers that accept user input
//! should clamp before calling. Arithmetic saturates at the `i64` bounds.

use serde::{Deserialize, Serialize};

/// Default first page
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 10;

/// Point-in-time copy of the pagination fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSnapshot {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

/// Pagination state with a derived offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    limit: i64,
    offset: i64,
    total: i64,
    default_page: i64,
    default_limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

impl Pagination {
    /// Create pagination at page 1 with 10 items per page
    pub fn new() -> Self {
        Self::default()
    }

    /// Create pagination whose starting point (and reset target) is `page`/`limit`
    pub fn with_defaults(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            offset: offset_for(page, limit),
            total: 0,
            default_page: page,
            default_limit: limit,
        }
    }

    /// Set page and limit together
    pub fn set_pagination(&mut self, page: i64, limit: i64) -> &mut Self {
        self.page = page;
        self.limit = limit;
        self.recompute_offset();
        self
    }

    /// Set the page, keeping the current limit
    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.page = page;
        self.recompute_offset();
        self
    }

    /// Set the limit, keeping the current page
    pub fn set_page_size(&mut self, limit: i64) -> &mut Self {
        self.limit = limit;
        self.recompute_offset();
        self
    }

    /// Advance one page
    pub fn next_page(&mut self) -> &mut Self {
        self.page = self.page.saturating_add(1);
        self.recompute_offset();
        self
    }

    /// Go back one page; no-op on the first page
    pub fn prev_page(&mut self) -> &mut Self {
        if self.page > 1 {
            self.page -= 1;
            self.recompute_offset();
        }
        self
    }

    /// Record the total number of items reported by the API
    pub fn set_total(&mut self, total: i64) -> &mut Self {
        self.total = total;
        self
    }

    pub fn has_next_page(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    /// Number of pages needed for `total` items
    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 || self.total <= 0 {
            return 0;
        }
        (self.total - 1) / self.limit + 1
    }

    /// Restore the defaults (total goes back to 0)
    pub fn reset(&mut self) -> &mut Self {
        self.page = self.default_page;
        self.limit = self.default_limit;
        self.total = 0;
        self.recompute_offset();
        self
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> PaginationSnapshot {
        PaginationSnapshot {
            page: self.page,
            limit: self.limit,
            offset: self.offset,
            total: self.total,
        }
    }

    fn recompute_offset(&mut self) {
        self.offset = offset_for(self.page, self.limit);
    }
}

fn offset_for(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}
