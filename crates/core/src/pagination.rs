//! Pagination arithmetic for API queries.
//!
//! The service paginates through `max`/`offset` query parameters, while
//! callers think in terms of a page size and a 1-based page number.
//! `max = -1` disables pagination entirely.

use serde::{Deserialize, Serialize};

/// Caller-facing pagination spec: page size (`max`) and 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page size; `-1` disables pagination.
    pub max: i64,
    /// 1-based page number.
    pub page: i64,
}

impl PageRequest {
    /// Unpaginated request: every result in one response.
    pub const ALL: PageRequest = PageRequest { max: -1, page: 1 };

    pub fn new(max: i64, page: i64) -> Self {
        Self { max, page }
    }

    /// Derived `offset` parameter: 0 when pagination is disabled, otherwise
    /// `max * (page - 1)` clamped to non-negative.
    pub fn offset(&self) -> i64 {
        if self.max == -1 {
            0
        } else {
            (self.max * (self.page - 1)).max(0)
        }
    }

    /// Render the `max=..&offset=..` query fragment.
    pub fn to_query(&self) -> String {
        format!("max={}&offset={}", self.max, self.offset())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::ALL
    }
}

/// Append pagination parameters to a URL without a query string.
pub fn paginated_url(url: &str, page: &PageRequest) -> String {
    format!("{}?{}", url, page.to_query())
}

/// One page of results plus whether another page exists on the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<T> {
    pub values: Vec<T>,
    /// True when the server's total count extends past this page.
    pub next: bool,
}

impl<T> Paged<T> {
    /// Wrap a result slice. `next` is true when pagination is active and
    /// `max * page` is still below the server-reported total.
    pub fn new(values: Vec<T>, page: &PageRequest, total_count: i64) -> Self {
        let next = page.max > -1 && page.max * page.page < total_count;
        Self { values, next }
    }
}
