//! Entity providers bound to one location.
//!
//! An [`EntityProvider`] pairs a [`Storage`] with a fixed location so that
//! callers manipulating one kind of entity never repeat the collection
//! name. It adds two behaviors on top of the storage contract:
//!
//! - [`EntityProvider::get_all`] walks every page of a query
//! - [`EntityProvider::add`] skips storage entirely for an empty batch
//!
//! Errors from storage are returned unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cms_persistence::backends::memory::MemoryStorage;
//! use cms_persistence::provider::EntityProvider;
//! use cms_persistence::filter::ResourceFilter;
//! use cms_persistence::types::Sort;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let posts = EntityProvider::new(Arc::new(MemoryStorage::new()), "posts");
//!
//! let entities = (0..25).map(|i| json!({"id": i, "status": "published"})).collect();
//! assert_eq!(posts.add(entities).await?.inserted_count, 25);
//!
//! let filter = ResourceFilter::new().equal("status", "published")?;
//! let all = posts.get_all(Some(&filter), None, Sort::new().asc("id")).await?;
//! assert_eq!(all.len(), 25);
//! # Ok::<(), cms_persistence::StorageError>(())
//! # }).unwrap();
//! ```

mod detached;
mod sink;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::Storage;
use crate::error::{StorageError, StorageResult};
use crate::filter::ResourceFilter;
use crate::types::{AddResult, Pagination, Projection, ResourceQuery, Sort};

pub use detached::DetachedProvider;
pub use sink::{ErrorSink, TracingErrorSink};

/// Gives access to the entities of one location.
pub struct EntityProvider<S: Storage + ?Sized> {
    storage: Arc<S>,
    location: String,
    error_sink: Arc<dyn ErrorSink>,
}

impl<S: Storage + ?Sized> EntityProvider<S> {
    /// Creates a provider for `location`.
    pub fn new(storage: Arc<S>, location: impl Into<String>) -> Self {
        Self {
            storage,
            location: location.into(),
            error_sink: Arc::new(TracingErrorSink),
        }
    }

    /// Replaces the sink receiving errors of detached operations.
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Returns the bound location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Fetches the first entity matching `filter`.
    pub async fn get_one(
        &self,
        filter: Option<&ResourceFilter>,
        fields: Option<&Projection>,
    ) -> StorageResult<Option<Value>> {
        tracing::debug!("Fetching one entity from '{}'", self.location);
        self.storage.get_one(&self.location, filter, fields).await
    }

    /// Fetches one page of entities.
    pub async fn get(&self, query: &ResourceQuery) -> StorageResult<(Vec<Value>, Pagination)> {
        tracing::debug!(
            "Fetching page {} of '{}'",
            query.page_index(),
            self.location
        );
        self.storage.get(&self.location, query).await
    }

    /// Fetches every entity matching `filter`, page after page.
    ///
    /// Pages are requested sequentially with the backend default limit and
    /// concatenated in page order. The first failing page aborts the walk;
    /// entities of earlier pages are discarded.
    ///
    /// # Errors
    ///
    /// * `StorageError::InvalidQuery` - If the backend reports matches but
    ///   no page holding them (a default limit of 0)
    pub async fn get_all(
        &self,
        filter: Option<&ResourceFilter>,
        fields: Option<&Projection>,
        sort: Sort,
    ) -> StorageResult<Vec<Value>> {
        let mut query = ResourceQuery {
            filter: filter.cloned(),
            fields: fields.cloned(),
            limit: None,
            page: None,
            sort,
        };
        let mut entities = Vec::new();
        let mut page: u32 = 0;

        loop {
            query.page = Some(page);
            let (mut resources, pagination) = self.get(&query).await?;
            if pagination.pages == 0 && pagination.size > 0 {
                return Err(StorageError::InvalidQuery {
                    message: format!(
                        "{} reported {} match(es) in '{}' with a page limit of {}",
                        self.storage.backend_name(),
                        pagination.size,
                        self.location,
                        pagination.limit
                    ),
                });
            }
            entities.append(&mut resources);

            if u64::from(page) + 1 >= pagination.pages {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            "Fetched {} entities from '{}' in {} page(s)",
            entities.len(),
            self.location,
            page + 1
        );
        Ok(entities)
    }

    /// Adds entities.
    ///
    /// An empty batch returns [`AddResult::empty`] without reaching storage.
    pub async fn add(&self, entities: Vec<Value>) -> StorageResult<AddResult> {
        if entities.is_empty() {
            return Ok(AddResult::empty());
        }

        tracing::debug!("Adding {} entities to '{}'", entities.len(), self.location);
        self.storage.add(&self.location, entities).await
    }

    /// Merges `data` into one entity matching `filter`.
    pub async fn update_one(
        &self,
        filter: &ResourceFilter,
        data: Map<String, Value>,
    ) -> StorageResult<u64> {
        tracing::debug!("Updating one entity of '{}'", self.location);
        self.storage.update_one(&self.location, filter, data).await
    }

    /// Removes every entity matching `filter`.
    pub async fn remove(&self, filter: &ResourceFilter) -> StorageResult<u64> {
        tracing::debug!("Removing entities from '{}'", self.location);
        self.storage.remove(&self.location, filter).await
    }

    /// Removes `field` from every matching entity.
    pub async fn remove_field(
        &self,
        field: &str,
        filter: Option<&ResourceFilter>,
    ) -> StorageResult<u64> {
        tracing::debug!(
            "Removing field '{}' from entities of '{}'",
            field,
            self.location
        );
        self.storage
            .remove_field(&self.location, field, filter)
            .await
    }

    fn report(&self, operation: &'static str, error: &StorageError) {
        self.error_sink.report(&self.location, operation, error);
    }
}

impl<S: Storage + ?Sized + 'static> EntityProvider<S> {
    /// Returns a fire-and-forget view of this provider.
    pub fn detach(&self) -> DetachedProvider<S> {
        DetachedProvider::new(self.clone())
    }
}

impl<S: Storage + ?Sized> Clone for EntityProvider<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            location: self.location.clone(),
            error_sink: Arc::clone(&self.error_sink),
        }
    }
}

impl<S: Storage + ?Sized> fmt::Debug for EntityProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityProvider")
            .field("backend", &self.storage.backend_name())
            .field("location", &self.location)
            .finish()
    }
}
