//! Pagination metadata returned alongside a page of resources.

use serde::{Deserialize, Serialize};

/// Describes where a page sits in the full result set.
///
/// The field names are part of the public contract and are serialized
/// verbatim: `limit`, `page`, `pages`, `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of resources per page, as requested.
    pub limit: u32,

    /// Zero-based index of the page.
    pub page: u32,

    /// Total number of pages (`ceil(size / limit)`).
    pub pages: u64,

    /// Total number of matching resources, independent of `limit` and `page`.
    pub size: u64,
}

impl Pagination {
    /// Computes the pagination of page `page` for `size` matching resources.
    pub fn new(limit: u32, page: u32, size: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            size.div_ceil(u64::from(limit))
        };

        Self {
            limit,
            page,
            pages,
            size,
        }
    }

    /// Number of resources preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit)
    }

    /// Returns true when no page follows this one.
    pub fn is_last_page(&self) -> bool {
        u64::from(self.page) + 1 >= self.pages
    }
}
