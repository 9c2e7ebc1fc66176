//! Database backend implementations.
//!
//! This module contains implementations of the storage traits for the
//! supported backends. Backends other than the in-memory one are gated
//! behind a feature flag.
//!
//! # Available Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | (always) | In-process storage, great for tests and development |
//! | MongoDB | `mongodb` | Document store with native JSON support |
//!
//! # Example
//!
//! ```
//! use cms_persistence::backends::memory::{MemoryStorage, MemoryStorageConfig};
//! use cms_persistence::core::Storage;
//!
//! let storage = MemoryStorage::with_config(MemoryStorageConfig { default_limit: 25 });
//! assert_eq!(storage.default_limit(), 25);
//! ```

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;
