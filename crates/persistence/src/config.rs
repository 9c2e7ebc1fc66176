//! Storage configuration.
//!
//! [`StorageConfig`] selects and configures the backend, either
//! programmatically or from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CMS_STORAGE_BACKEND` | memory | Backend (`memory` or `mongodb`) |
//! | `CMS_MONGODB_URI` | mongodb://localhost:27017 | MongoDB connection string |
//! | `CMS_MONGODB_DATABASE` | cms | MongoDB database name |
//! | `CMS_DEFAULT_PAGE_LIMIT` | 10 | Page size when a query sets none |
//! | `CMS_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```
//! use cms_persistence::config::{self, StorageConfig};
//! use cms_persistence::core::{BackendKind, Storage};
//!
//! # tokio_test::block_on(async {
//! let config = StorageConfig {
//!     backend: BackendKind::Memory,
//!     default_page_limit: 20,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! let database = config::connect(&config).await?;
//! assert_eq!(database.default_limit(), 20);
//! # Ok::<(), cms_persistence::StorageError>(())
//! # }).unwrap();
//! ```

use std::sync::Arc;

use clap::Parser;

use crate::backends::memory::{MemoryStorage, MemoryStorageConfig};
use crate::core::{BackendKind, DEFAULT_PAGE_LIMIT, Database, Storage};
use crate::error::StorageResult;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration of the storage layer.
///
/// This struct can be constructed from environment variables using
/// [`StorageConfig::from_env`], from command line arguments using
/// [`StorageConfig::parse`], or programmatically.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "cms-storage")]
#[command(about = "CMS storage configuration")]
pub struct StorageConfig {
    /// Storage backend.
    #[arg(long, value_enum, env = "CMS_STORAGE_BACKEND", default_value = "memory")]
    pub backend: BackendKind,

    /// MongoDB connection string.
    #[arg(
        long,
        env = "CMS_MONGODB_URI",
        default_value = "mongodb://localhost:27017"
    )]
    pub mongodb_uri: String,

    /// MongoDB database name.
    #[arg(long, env = "CMS_MONGODB_DATABASE", default_value = "cms")]
    pub mongodb_database: String,

    /// Page size used when a query does not set one.
    #[arg(long, env = "CMS_DEFAULT_PAGE_LIMIT", default_value = "10")]
    pub default_page_limit: u32,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "CMS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "cms".to_string(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            log_level: "info".to_string(),
        }
    }
}

impl StorageConfig {
    /// Creates a configuration from environment variables only.
    ///
    /// Command line arguments of the host process are ignored. Invalid
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::try_parse_from(["cms-storage"]).unwrap_or_default()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.default_page_limit == 0 {
            errors.push("Default page limit cannot be 0".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!("Unknown log level: {}", self.log_level));
        }

        if self.backend == BackendKind::MongoDB {
            if !self.mongodb_uri.starts_with("mongodb://")
                && !self.mongodb_uri.starts_with("mongodb+srv://")
            {
                errors.push(format!(
                    "MongoDB URI must start with mongodb:// or mongodb+srv://: {}",
                    self.mongodb_uri
                ));
            }

            if self.mongodb_database.is_empty() {
                errors.push("MongoDB database name cannot be empty".to_string());
            } else if self
                .mongodb_database
                .contains(['/', '\\', '.', ' ', '"', '$'])
            {
                errors.push(format!(
                    "MongoDB database name contains invalid characters: {}",
                    self.mongodb_database
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configuration of the in-memory backend.
    pub fn memory_config(&self) -> MemoryStorageConfig {
        MemoryStorageConfig {
            default_limit: self.default_page_limit,
        }
    }

    /// Configuration of the MongoDB backend.
    #[cfg(feature = "mongodb")]
    pub fn mongo_config(&self) -> crate::backends::mongodb::MongoConfig {
        crate::backends::mongodb::MongoConfig {
            uri: self.mongodb_uri.clone(),
            database: self.mongodb_database.clone(),
            default_limit: self.default_page_limit,
            ..Default::default()
        }
    }
}

/// Builds and connects the configured backend.
///
/// # Errors
///
/// * `StorageError::Backend(Unavailable)` - If the backend was not compiled in
/// * `StorageError::Backend(ConnectionFailed)` - If the backend is unreachable
pub async fn connect(config: &StorageConfig) -> StorageResult<Arc<dyn Database>> {
    let database: Arc<dyn Database> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryStorage::with_config(config.memory_config())),
        BackendKind::MongoDB => connect_mongodb(config).await?,
    };

    database.connect().await?;
    tracing::info!("Storage backend '{}' connected", database.backend_name());

    Ok(database)
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(config: &StorageConfig) -> StorageResult<Arc<dyn Database>> {
    let storage = crate::backends::mongodb::MongoStorage::new(config.mongo_config()).await?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_config: &StorageConfig) -> StorageResult<Arc<dyn Database>> {
    Err(crate::error::StorageError::Backend(
        crate::error::BackendError::Unavailable {
            backend_name: "mongodb".to_string(),
            message: "compiled without the `mongodb` feature".to_string(),
        },
    ))
}
