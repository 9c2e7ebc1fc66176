//! Core resource storage trait.
//!
//! This module defines the [`Storage`] trait, the contract every persistence
//! backend fulfills. Operations are addressed by a `location` (a collection
//! or table name) and take filters built with
//! [`ResourceFilter`](crate::filter::ResourceFilter).

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageResult;
use crate::filter::ResourceFilter;
use crate::types::{AddResult, Pagination, Projection, ResourceQuery};

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Core storage trait for CMS resources.
///
/// Every method is required: a backend that compiles implements the whole
/// data contract. Lifecycle and administrative operations live in the
/// [`Database`](super::Database) extension trait.
///
/// Backends must translate every filter operator. An operator a backend
/// cannot express fails with
/// [`StorageError::UnsupportedOperator`](crate::error::StorageError::UnsupportedOperator);
/// it is never silently dropped.
///
/// # Example
///
/// ```
/// use cms_persistence::backends::memory::MemoryStorage;
/// use cms_persistence::core::Storage;
/// use cms_persistence::filter::ResourceFilter;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let storage = MemoryStorage::new();
///
/// storage
///     .add("posts", vec![json!({"id": "1", "status": "draft"})])
///     .await?;
///
/// let filter = ResourceFilter::new().equal("id", "1")?;
/// let mut data = serde_json::Map::new();
/// data.insert("status".to_string(), json!("published"));
/// assert_eq!(storage.update_one("posts", &filter, data).await?, 1);
///
/// let post = storage.get_one("posts", Some(&filter), None).await?;
/// assert_eq!(post.unwrap()["status"], "published");
/// # Ok::<(), cms_persistence::StorageError>(())
/// # }).unwrap();
/// ```
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Page size applied when [`ResourceQuery::limit`] is `None`.
    fn default_limit(&self) -> u32 {
        DEFAULT_PAGE_LIMIT
    }

    /// Inserts resources into a location.
    ///
    /// # Errors
    ///
    /// * `StorageError::InvalidResource` - If a resource is not a JSON object
    async fn add(&self, location: &str, resources: Vec<Value>) -> StorageResult<AddResult>;

    /// Fetches one page of resources.
    ///
    /// The returned [`Pagination::size`] counts every match regardless of
    /// the requested page.
    async fn get(
        &self,
        location: &str,
        query: &ResourceQuery,
    ) -> StorageResult<(Vec<Value>, Pagination)>;

    /// Fetches the first resource matching `filter`.
    ///
    /// "First" follows the backend's natural order. A `None` filter matches
    /// every resource.
    async fn get_one(
        &self,
        location: &str,
        filter: Option<&ResourceFilter>,
        fields: Option<&Projection>,
    ) -> StorageResult<Option<Value>>;

    /// Merges `data` into at most one resource matching `filter`.
    ///
    /// Keys of `data` may be dotted paths. Returns the number of matched
    /// resources (0 or 1); no match is not an error.
    async fn update_one(
        &self,
        location: &str,
        filter: &ResourceFilter,
        data: Map<String, Value>,
    ) -> StorageResult<u64>;

    /// Removes every resource matching `filter` and returns their count.
    async fn remove(&self, location: &str, filter: &ResourceFilter) -> StorageResult<u64>;

    /// Strips `field` from every matching resource holding it.
    ///
    /// Returns the number of modified resources. A `None` filter matches
    /// every resource.
    async fn remove_field(
        &self,
        location: &str,
        field: &str,
        filter: Option<&ResourceFilter>,
    ) -> StorageResult<u64>;
}
