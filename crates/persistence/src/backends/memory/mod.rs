//! In-memory backend implementation.
//!
//! [`MemoryStorage`] keeps every location in a `HashMap` of JSON resources
//! behind a `parking_lot::RwLock`. It implements the whole [`Storage`]
//! contract and is the default backend of
//! [`StorageConfig`](crate::config::StorageConfig), which makes it the
//! natural choice for tests and development.
//!
//! # Semantics
//!
//! - Field paths are dotted (`meta.author`) and traverse arrays.
//! - Comparisons only match values of the same JSON type. Date values
//!   compare against RFC 3339 strings and epoch milliseconds.
//! - `search` matches case-insensitively on whole words of every string in
//!   the resource. Its relevance score is the number of term hits.
//! - `get_one` returns the first match in insertion order.
//! - Sorting on an array field uses its smallest element in ascending
//!   order and its largest in descending order.
//!
//! Data lives as long as the value; nothing is persisted.
//!
//! [`Storage`]: crate::core::Storage

mod document;
mod matcher;
mod storage;

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{DEFAULT_PAGE_LIMIT, Database};
use crate::error::{StorageError, StorageResult};

/// Configuration for the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStorageConfig {
    /// Page size used when a query does not set one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// In-memory storage for CMS resources.
pub struct MemoryStorage {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    config: MemoryStorageConfig,
}

impl Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("config", &self.config)
            .field("locations", &self.collections.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates an empty storage with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryStorageConfig::default())
    }

    /// Creates an empty storage with a custom configuration.
    pub fn with_config(config: MemoryStorageConfig) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &MemoryStorageConfig {
        &self.config
    }

    /// Returns the names of the locations holding resources.
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = self.collections.read().keys().cloned().collect();
        locations.sort();
        locations
    }

    /// Returns the number of resources stored in `location`.
    pub fn count(&self, location: &str) -> usize {
        self.collections
            .read()
            .get(location)
            .map_or(0, |resources| resources.len())
    }
}

#[async_trait]
impl Database for MemoryStorage {
    async fn connect(&self) -> StorageResult<()> {
        tracing::info!("In-memory storage ready");
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        tracing::info!(
            "In-memory storage closed with {} location(s)",
            self.collections.read().len()
        );
        Ok(())
    }

    async fn rename_collection(&self, location: &str, new_location: &str) -> StorageResult<()> {
        let mut collections = self.collections.write();

        if collections.contains_key(new_location) {
            return Err(StorageError::InvalidQuery {
                message: format!("target location '{}' already exists", new_location),
            });
        }

        let resources =
            collections
                .remove(location)
                .ok_or_else(|| StorageError::LocationNotFound {
                    location: location.to_string(),
                })?;
        collections.insert(new_location.to_string(), resources);

        tracing::info!("Renamed location '{}' to '{}'", location, new_location);
        Ok(())
    }

    async fn remove_collection(&self, location: &str) -> StorageResult<()> {
        self.collections
            .write()
            .remove(location)
            .ok_or_else(|| StorageError::LocationNotFound {
                location: location.to_string(),
            })?;

        tracing::info!("Removed location '{}'", location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config: MemoryStorageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MemoryStorageConfig::default());
        assert_eq!(config.default_limit, 10);
    }

    #[tokio::test]
    async fn test_rename_collection() {
        let storage = MemoryStorage::new();
        storage.add("posts", vec![json!({"id": "1"})]).await.unwrap();

        storage.rename_collection("posts", "articles").await.unwrap();
        assert_eq!(storage.locations(), vec!["articles".to_string()]);
        assert_eq!(storage.count("articles"), 1);

        let err = storage.rename_collection("posts", "pages").await.unwrap_err();
        assert!(matches!(err, StorageError::LocationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_location_fails() {
        let storage = MemoryStorage::new();
        storage.add("posts", vec![json!({"id": "1"})]).await.unwrap();
        storage.add("pages", vec![json!({"id": "2"})]).await.unwrap();

        let err = storage.rename_collection("posts", "pages").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidQuery { .. }));
        assert_eq!(storage.count("posts"), 1);
    }

    #[tokio::test]
    async fn test_remove_collection() {
        let storage = MemoryStorage::new();
        storage.add("posts", vec![json!({"id": "1"})]).await.unwrap();

        storage.remove_collection("posts").await.unwrap();
        assert!(storage.locations().is_empty());

        let err = storage.remove_collection("posts").await.unwrap_err();
        assert!(matches!(err, StorageError::LocationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_index_operations_not_implemented() {
        let storage = MemoryStorage::new();
        let err = storage.get_indexes("posts").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "operation 'get_indexes' is not implemented by memory"
        );
    }
}
