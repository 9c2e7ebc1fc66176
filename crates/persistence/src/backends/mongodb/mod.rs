//! MongoDB backend implementation.
//!
//! Resources are stored as documents, one collection per location.
//! Filters are translated by [`MongoQueryBuilder`] into native query
//! documents; every operator has a native counterpart (`$eq`, `$in`,
//! `$regex`, `$text`, ...).
//!
//! # Behavior
//!
//! - `_id` is never returned unless a projection includes it explicitly.
//! - `search` requires a text index on the location (see
//!   [`Database::create_indexes`](crate::core::Database::create_indexes))
//!   and is only allowed at the top level of a filter.
//! - Sorting by relevance without a `search` fails with
//!   `StorageError::InvalidQuery` before reaching the server.
//! - `get_one` returns the first match in natural order.
//!
//! # Example
//!
//! ```no_run
//! use cms_persistence::backends::mongodb::{MongoConfig, MongoStorage};
//! use cms_persistence::core::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MongoStorage::new(MongoConfig {
//!     uri: "mongodb://localhost:27017".to_string(),
//!     database: "cms".to_string(),
//!     ..Default::default()
//! })
//! .await?;
//!
//! storage.connect().await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod query;
mod storage;

pub use backend::{MongoConfig, MongoStorage};
pub use query::MongoQueryBuilder;
