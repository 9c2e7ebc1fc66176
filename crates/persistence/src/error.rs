//! Error types for the persistence layer.
//!
//! Two families of errors exist:
//!
//! - [`FilterError`] is returned synchronously while building a
//!   [`ResourceFilter`](crate::filter::ResourceFilter). These are programmer
//!   errors and are not meant to be retried.
//! - [`StorageError`] is returned by every asynchronous storage operation.
//!   Backend errors flow through providers unchanged.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::filter::Operator;

/// Errors raised while building a resource filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The field name of an operation is empty.
    #[error("invalid field for '{operator}' operation: field name must be a non-empty string")]
    InvalidField { operator: Operator },

    /// The value does not belong to the operator's allowed value set.
    #[error("invalid value for '{operator}' operation on field '{field}': {message}")]
    InvalidValue {
        operator: Operator,
        field: String,
        message: String,
    },
}

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A filter could not be built.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The backend does not implement the requested operation.
    #[error("operation '{operation}' is not implemented by {backend}")]
    NotImplemented {
        backend: &'static str,
        operation: &'static str,
    },

    /// The backend cannot translate a filter operator.
    #[error("unsupported operator '{operator}' for {backend}: {reason}")]
    UnsupportedOperator {
        backend: &'static str,
        operator: Operator,
        reason: String,
    },

    /// The query is well formed but cannot be executed as requested.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// A resource or update document has the wrong shape.
    #[error("invalid resource for location '{location}': {message}")]
    InvalidResource { location: String, message: String },

    /// The location (collection) does not exist.
    #[error("location not found: {location}")]
    LocationNotFound { location: String },

    /// Backend-specific errors.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for filter construction.
pub type FilterResult<T> = Result<T, FilterError>;

impl StorageError {
    /// Builds a [`StorageError::NotImplemented`] error.
    pub fn not_implemented(backend: &'static str, operation: &'static str) -> Self {
        StorageError::NotImplemented { backend, operation }
    }

    /// Builds a [`StorageError::InvalidResource`] error.
    pub fn invalid_resource(location: &str, message: impl Into<String>) -> Self {
        StorageError::InvalidResource {
            location: location.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "mongodb".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}
