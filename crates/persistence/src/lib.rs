//! CMS Persistence Layer
//!
//! This crate provides the storage abstraction of a content management
//! system: a storage-agnostic filter language, a storage contract every
//! backend implements, and entity providers bound to one collection.
//!
//! # Features
//!
//! - **Resource filters**: Build queries once, run them on any backend
//! - **Pluggable backends**: In-memory (always available) and MongoDB
//! - **Entity providers**: Location-bound access with full-result paging
//! - **Detached operations**: Fire-and-forget mutations with error sinks
//!
//! # Backend Features
//!
//! Enable backends with feature flags in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cms-persistence = { version = "0.1", features = ["mongodb"] }
//! ```
//!
//! Available features:
//! - `mongodb` - MongoDB document storage
//! - `logging` - `init_logging` built on `tracing-subscriber`
//!
//! # Architecture
//!
//! - [`filter`] - Resource filters and their operations
//! - [`types`] - Pagination, query options and index descriptions
//! - [`error`] - Error types for all operations
//! - [`core`] - Storage traits and abstractions
//! - [`provider`] - Entity providers bound to a location
//! - [`backends`] - Backend implementations
//! - [`config`] - Backend selection from the environment
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use cms_persistence::backends::memory::MemoryStorage;
//! use cms_persistence::filter::ResourceFilter;
//! use cms_persistence::provider::EntityProvider;
//! use cms_persistence::types::{Projection, ResourceQuery, Sort};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let videos = EntityProvider::new(Arc::new(MemoryStorage::new()), "videos");
//!
//! videos
//!     .add(vec![
//!         json!({"id": "1", "title": "Keynote", "state": "published", "views": 120}),
//!         json!({"id": "2", "title": "Workshop", "state": "draft", "views": 12}),
//!         json!({"id": "3", "title": "Panel", "state": "published", "views": 48}),
//!     ])
//!     .await?;
//!
//! let filter = ResourceFilter::new()
//!     .equal("state", "published")?
//!     .greater_than("views", 40)?;
//!
//! let query = ResourceQuery::new()
//!     .with_filter(filter)
//!     .with_fields(Projection::include(["id"]))
//!     .with_sort(Sort::new().desc("views"));
//!
//! let (page, pagination) = videos.get(&query).await?;
//! assert_eq!(page, vec![json!({"id": "1"}), json!({"id": "3"})]);
//! assert_eq!(pagination.size, 2);
//! # Ok::<(), cms_persistence::StorageError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod filter;
#[cfg(feature = "logging")]
pub mod logging;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{FilterError, StorageError, StorageResult};
pub use filter::{Operator, ResourceFilter};
pub use types::{Pagination, Projection, ResourceQuery, Sort, SortOrder};

// Re-export core traits
pub use core::{Database, Storage};
pub use provider::EntityProvider;

#[cfg(feature = "logging")]
pub use logging::init_logging;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
