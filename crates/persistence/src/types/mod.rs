//! Core types for the persistence layer.
//!
//! - [`Pagination`] - Position of a page in the full result set
//! - [`ResourceQuery`], [`Projection`], [`Sort`] - Options of a `get` call
//! - [`AddResult`] - Outcome of an insert
//! - [`IndexSpec`] - Index descriptions for administrative calls
//!
//! # Example
//!
//! ```
//! use cms_persistence::filter::ResourceFilter;
//! use cms_persistence::types::{Projection, ResourceQuery, Sort};
//!
//! let query = ResourceQuery::new()
//!     .with_filter(ResourceFilter::new().search("keynote"))
//!     .with_fields(Projection::include(["id", "title"]))
//!     .with_sort(Sort::new().score("score").desc("date"))
//!     .with_limit(20);
//!
//! assert_eq!(query.page_index(), 0);
//! ```

mod index;
mod pagination;
mod query;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use index::{IndexDirection, IndexSpec};
pub use pagination::Pagination;
pub use query::{Projection, ResourceQuery, Sort, SortOrder};

/// Outcome of an insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddResult {
    /// Number of inserted resources.
    pub inserted_count: u64,

    /// The inserted resources.
    pub resources: Vec<Value>,
}

impl AddResult {
    /// An insert of nothing.
    pub fn empty() -> Self {
        Self::default()
    }
}
