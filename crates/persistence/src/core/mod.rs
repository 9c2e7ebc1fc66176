//! Core storage traits and abstractions.
//!
//! - [`Storage`] - The data contract every backend implements
//! - [`Database`] - Connection lifecycle and collection administration
//! - [`BackendKind`] - Identification of the shipped backends
//!
//! # Trait Hierarchy
//!
//! ```text
//! Storage
//!     └── Database
//! ```
//!
//! [`EntityProvider`](crate::provider::EntityProvider) only needs
//! [`Storage`]; [`Database`] is for code owning the backend lifecycle.

mod backend;
mod database;
mod storage;

pub use backend::BackendKind;
pub use database::Database;
pub use storage::{DEFAULT_PAGE_LIMIT, Storage};
