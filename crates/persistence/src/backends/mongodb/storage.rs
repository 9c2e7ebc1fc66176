//! Storage and Database trait implementations for MongoDB.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::IndexModel;
use mongodb::options::{FindOptions, IndexOptions};
use serde_json::{Map, Value};

use crate::core::{Database, Storage};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::filter::ResourceFilter;
use crate::types::{AddResult, IndexDirection, IndexSpec, Pagination, Projection, ResourceQuery};

use super::backend::{MongoStorage, to_document, to_json};
use super::query::MongoQueryBuilder;

/// Server error code of a missing namespace.
const NAMESPACE_NOT_FOUND: i32 = 26;

fn build_filter(filter: Option<&ResourceFilter>) -> StorageResult<Document> {
    filter.map_or_else(|| Ok(Document::new()), MongoQueryBuilder::build_filter)
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(e) if e.code == NAMESPACE_NOT_FOUND)
}

#[async_trait]
impl Storage for MongoStorage {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn default_limit(&self) -> u32 {
        self.config.default_limit
    }

    async fn add(&self, location: &str, resources: Vec<Value>) -> StorageResult<AddResult> {
        if resources.is_empty() {
            return Ok(AddResult::empty());
        }

        let documents = resources
            .iter()
            .map(|r| to_document(location, r))
            .collect::<StorageResult<Vec<_>>>()?;

        let result = self.collection(location).insert_many(documents).await?;
        let inserted_count = result.inserted_ids.len() as u64;

        tracing::debug!("Inserted {} resource(s) into '{}'", inserted_count, location);

        Ok(AddResult {
            inserted_count,
            resources,
        })
    }

    async fn get(
        &self,
        location: &str,
        query: &ResourceQuery,
    ) -> StorageResult<(Vec<Value>, Pagination)> {
        let filter = build_filter(query.filter.as_ref())?;
        let has_search = query
            .filter
            .as_ref()
            .is_some_and(|f| f.search_text().is_some());
        let sort = MongoQueryBuilder::build_sort(&query.sort, has_search)?;
        let score_field = query.sort.score_field().filter(|_| has_search);
        let projection = MongoQueryBuilder::build_projection(query.fields.as_ref(), score_field);

        let limit = query.limit.unwrap_or(self.config.default_limit);
        let page = query.page_index();
        let collection = self.collection(location);

        let size = collection.count_documents(filter.clone()).await?;
        let pagination = Pagination::new(limit, page, size);

        let resources = if limit == 0 {
            Vec::new()
        } else {
            let mut options = FindOptions::default();
            options.projection = Some(projection);
            options.skip = Some(pagination.offset());
            options.limit = Some(i64::from(limit));
            if !sort.is_empty() {
                options.sort = Some(sort);
            }

            collection
                .find(filter)
                .with_options(options)
                .await?
                .try_collect::<Vec<Document>>()
                .await?
                .into_iter()
                .map(to_json)
                .collect()
        };

        tracing::debug!(
            "Fetched page {} of '{}' ({} match(es))",
            page,
            location,
            size
        );

        Ok((resources, pagination))
    }

    async fn get_one(
        &self,
        location: &str,
        filter: Option<&ResourceFilter>,
        fields: Option<&Projection>,
    ) -> StorageResult<Option<Value>> {
        let filter = build_filter(filter)?;
        let projection = MongoQueryBuilder::build_projection(fields, None);

        let found = self
            .collection(location)
            .find_one(filter)
            .projection(projection)
            .await?;

        Ok(found.map(to_json))
    }

    async fn update_one(
        &self,
        location: &str,
        filter: &ResourceFilter,
        data: Map<String, Value>,
    ) -> StorageResult<u64> {
        if data.is_empty() {
            return Err(StorageError::invalid_resource(
                location,
                "update data must not be empty",
            ));
        }

        let filter = MongoQueryBuilder::build_filter(filter)?;
        let data = to_document(location, &Value::Object(data))?;

        let result = self
            .collection(location)
            .update_one(filter, doc! { "$set": data })
            .await?;

        tracing::debug!(
            "Updated {} resource(s) of '{}'",
            result.matched_count,
            location
        );
        Ok(result.matched_count)
    }

    async fn remove(&self, location: &str, filter: &ResourceFilter) -> StorageResult<u64> {
        let filter = MongoQueryBuilder::build_filter(filter)?;
        let result = self.collection(location).delete_many(filter).await?;

        tracing::debug!(
            "Removed {} resource(s) from '{}'",
            result.deleted_count,
            location
        );
        Ok(result.deleted_count)
    }

    async fn remove_field(
        &self,
        location: &str,
        field: &str,
        filter: Option<&ResourceFilter>,
    ) -> StorageResult<u64> {
        let filter = filter.cloned().unwrap_or_default().exists(field, true)?;
        let filter = MongoQueryBuilder::build_filter(&filter)?;

        let result = self
            .collection(location)
            .update_many(filter, doc! { "$unset": { field: "" } })
            .await?;

        tracing::debug!(
            "Removed field '{}' from {} resource(s) of '{}'",
            field,
            result.modified_count,
            location
        );
        Ok(result.modified_count)
    }
}

#[async_trait]
impl Database for MongoStorage {
    async fn connect(&self) -> StorageResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                StorageError::Backend(BackendError::ConnectionFailed {
                    backend_name: "mongodb".to_string(),
                    message: e.to_string(),
                })
            })?;

        tracing::info!(
            "Connected to MongoDB database '{}'",
            self.config.database
        );
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.client.clone().shutdown().await;
        tracing::info!("Closed MongoDB connection");
        Ok(())
    }

    async fn create_indexes(&self, location: &str, indexes: &[IndexSpec]) -> StorageResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models = indexes.iter().map(to_index_model).collect::<Vec<_>>();
        self.collection(location).create_indexes(models).await?;

        tracing::info!("Created {} index(es) on '{}'", indexes.len(), location);
        Ok(())
    }

    async fn get_indexes(&self, location: &str) -> StorageResult<Vec<IndexSpec>> {
        let models = self
            .collection(location)
            .list_indexes()
            .await?
            .try_collect::<Vec<IndexModel>>()
            .await?;

        Ok(models.iter().map(from_index_model).collect())
    }

    async fn drop_index(&self, location: &str, name: &str) -> StorageResult<()> {
        self.collection(location).drop_index(name).await?;
        tracing::info!("Dropped index '{}' of '{}'", name, location);
        Ok(())
    }

    async fn rename_collection(&self, location: &str, new_location: &str) -> StorageResult<()> {
        let database = &self.config.database;
        let command = doc! {
            "renameCollection": format!("{}.{}", database, location),
            "to": format!("{}.{}", database, new_location),
        };

        match self.client.database("admin").run_command(command).await {
            Ok(_) => {
                tracing::info!("Renamed location '{}' to '{}'", location, new_location);
                Ok(())
            }
            Err(e) if is_namespace_not_found(&e) => Err(StorageError::LocationNotFound {
                location: location.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_collection(&self, location: &str) -> StorageResult<()> {
        let existing = self
            .database
            .list_collection_names()
            .filter(doc! { "name": location })
            .await?;

        if existing.is_empty() {
            return Err(StorageError::LocationNotFound {
                location: location.to_string(),
            });
        }

        self.collection(location).drop().await?;
        tracing::info!("Removed location '{}'", location);
        Ok(())
    }
}

fn to_index_model(index: &IndexSpec) -> IndexModel {
    let mut keys = Document::new();
    for (field, direction) in &index.keys {
        let value = match direction {
            IndexDirection::Ascending => Bson::Int32(1),
            IndexDirection::Descending => Bson::Int32(-1),
            IndexDirection::Text => Bson::String("text".to_string()),
        };
        keys.insert(field.as_str(), value);
    }

    let options = IndexOptions::builder()
        .name(index.name.clone())
        .unique(index.unique)
        .build();

    IndexModel::builder().keys(keys).options(options).build()
}

/// Text indexes are listed as `{_fts: "text", _ftsx: 1}`; their fields come
/// from the index weights.
fn from_index_model(model: &IndexModel) -> IndexSpec {
    let options = model.options.as_ref();
    let mut spec = IndexSpec::new(
        options
            .and_then(|o| o.name.clone())
            .unwrap_or_default(),
    );
    spec.unique = options.and_then(|o| o.unique).unwrap_or(false);

    for (field, value) in &model.keys {
        match field.as_str() {
            "_fts" => {
                if let Some(weights) = options.and_then(|o| o.weights.as_ref()) {
                    for text_field in weights.keys() {
                        spec.keys.push((text_field.clone(), IndexDirection::Text));
                    }
                }
            }
            "_ftsx" => {}
            _ => {
                let direction = match value {
                    Bson::String(kind) if kind == "text" => IndexDirection::Text,
                    Bson::Int32(n) if *n < 0 => IndexDirection::Descending,
                    Bson::Int64(n) if *n < 0 => IndexDirection::Descending,
                    Bson::Double(n) if *n < 0.0 => IndexDirection::Descending,
                    _ => IndexDirection::Ascending,
                };
                spec.keys.push((field.clone(), direction));
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_model_round_trip() {
        let spec = IndexSpec::new("byDate")
            .with_key("date", IndexDirection::Descending)
            .with_key("id", IndexDirection::Ascending)
            .unique();

        let model = to_index_model(&spec);
        assert_eq!(model.keys, doc! { "date": -1, "id": 1 });
        assert_eq!(from_index_model(&model), spec);
    }

    #[test]
    fn test_text_index_from_weights() {
        let mut options = IndexOptions::default();
        options.name = Some("querySearch".to_string());
        options.weights = Some(doc! { "title": 1, "description": 1 });
        let model = IndexModel::builder()
            .keys(doc! { "_fts": "text", "_ftsx": 1 })
            .options(options)
            .build();

        let spec = from_index_model(&model);
        assert_eq!(spec.name, "querySearch");
        assert_eq!(
            spec.keys,
            vec![
                ("title".to_string(), IndexDirection::Text),
                ("description".to_string(), IndexDirection::Text),
            ]
        );
    }
}
