//! MongoDB backend implementation.

use std::fmt::Debug;
use std::time::Duration;

use mongodb::bson::{Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::DEFAULT_PAGE_LIMIT;
use crate::error::{BackendError, StorageError, StorageResult};

/// MongoDB backend for CMS resource storage.
pub struct MongoStorage {
    pub(super) client: Client,
    pub(super) database: Database,
    pub(super) config: MongoConfig,
}

impl Debug for MongoStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStorage")
            .field("database", &self.config.database)
            .field("default_limit", &self.config.default_limit)
            .finish_non_exhaustive()
    }
}

/// Configuration for the MongoDB backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string.
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Page size used when a query does not set one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Server selection timeout in milliseconds.
    #[serde(default = "default_server_selection_timeout_ms")]
    pub server_selection_timeout_ms: u64,

    /// Application name reported to the server.
    #[serde(default)]
    pub app_name: Option<String>,
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "cms".to_string()
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_connect_timeout_ms() -> u64 {
    10000
}

fn default_server_selection_timeout_ms() -> u64 {
    30000
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            default_limit: default_limit(),
            connect_timeout_ms: default_connect_timeout_ms(),
            server_selection_timeout_ms: default_server_selection_timeout_ms(),
            app_name: None,
        }
    }
}

impl MongoStorage {
    /// Creates a backend from its configuration.
    ///
    /// The driver connects lazily; call
    /// [`Database::connect`](crate::core::Database::connect) to check that
    /// the server is reachable.
    ///
    /// # Errors
    ///
    /// * `StorageError::InvalidQuery` - If `default_limit` is 0
    /// * `StorageError::Backend(ConnectionFailed)` - If the URI is invalid
    pub async fn new(config: MongoConfig) -> StorageResult<Self> {
        if config.default_limit == 0 {
            return Err(StorageError::InvalidQuery {
                message: "MongoDB default page limit cannot be 0".to_string(),
            });
        }

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "mongodb".to_string(),
                message: e.to_string(),
            })
        })?;

        options.connect_timeout = Some(Duration::from_millis(config.connect_timeout_ms));
        options.server_selection_timeout =
            Some(Duration::from_millis(config.server_selection_timeout_ms));
        if config.app_name.is_some() {
            options.app_name = config.app_name.clone();
        }

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        tracing::info!(
            "MongoDB backend configured for database '{}'",
            config.database
        );

        Ok(Self {
            client,
            database,
            config,
        })
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    pub(super) fn collection(&self, location: &str) -> Collection<Document> {
        self.database.collection::<Document>(location)
    }
}

/// Converts a JSON resource into a BSON document.
pub(super) fn to_document(location: &str, value: &Value) -> StorageResult<Document> {
    if !value.is_object() {
        return Err(StorageError::invalid_resource(
            location,
            "resource is not a JSON object",
        ));
    }

    mongodb::bson::to_document(value).map_err(|e| {
        StorageError::Backend(BackendError::SerializationError {
            message: e.to_string(),
        })
    })
}

/// Converts a BSON document into relaxed extended JSON.
pub(super) fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = MongoConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "cms");
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.connect_timeout_ms, 10000);
        assert_eq!(config.server_selection_timeout_ms, 30000);
        assert!(config.app_name.is_none());

        let parsed: MongoConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn test_new_rejects_zero_default_limit() {
        let config = MongoConfig {
            default_limit: 0,
            ..Default::default()
        };
        let err = MongoStorage::new(config).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidQuery { .. }));
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        let err = to_document("posts", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResource { .. }));

        let document = to_document("posts", &json!({"id": "1", "views": 3})).unwrap();
        assert_eq!(document.get_str("id").unwrap(), "1");
    }

    #[test]
    fn test_to_json() {
        let value = to_json(doc! {"id": "1", "views": 3_i64, "tags": ["a"]});
        assert_eq!(value, json!({"id": "1", "views": 3, "tags": ["a"]}));
    }
}
