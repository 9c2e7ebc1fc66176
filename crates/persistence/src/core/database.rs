//! Lifecycle and administration of a storage backend.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::types::IndexSpec;

use super::Storage;

/// Extension of [`Storage`] with connection and collection management.
///
/// Every method has a default body failing with
/// [`StorageError::NotImplemented`], so backends implement only what they
/// support.
#[async_trait]
pub trait Database: Storage {
    /// Establishes the connection to the backend.
    async fn connect(&self) -> StorageResult<()> {
        Err(StorageError::not_implemented(self.backend_name(), "connect"))
    }

    /// Closes the connection to the backend.
    async fn close(&self) -> StorageResult<()> {
        Err(StorageError::not_implemented(self.backend_name(), "close"))
    }

    /// Creates indexes on a location.
    async fn create_indexes(&self, location: &str, indexes: &[IndexSpec]) -> StorageResult<()> {
        let _ = (location, indexes);
        Err(StorageError::not_implemented(
            self.backend_name(),
            "create_indexes",
        ))
    }

    /// Lists the indexes of a location.
    async fn get_indexes(&self, location: &str) -> StorageResult<Vec<IndexSpec>> {
        let _ = location;
        Err(StorageError::not_implemented(
            self.backend_name(),
            "get_indexes",
        ))
    }

    /// Drops an index by name.
    async fn drop_index(&self, location: &str, name: &str) -> StorageResult<()> {
        let _ = (location, name);
        Err(StorageError::not_implemented(
            self.backend_name(),
            "drop_index",
        ))
    }

    /// Renames a location.
    ///
    /// # Errors
    ///
    /// * `StorageError::LocationNotFound` - If `location` does not exist
    async fn rename_collection(&self, location: &str, new_location: &str) -> StorageResult<()> {
        let _ = (location, new_location);
        Err(StorageError::not_implemented(
            self.backend_name(),
            "rename_collection",
        ))
    }

    /// Removes a location and everything it holds.
    ///
    /// # Errors
    ///
    /// * `StorageError::LocationNotFound` - If `location` does not exist
    async fn remove_collection(&self, location: &str) -> StorageResult<()> {
        let _ = location;
        Err(StorageError::not_implemented(
            self.backend_name(),
            "remove_collection",
        ))
    }
}
