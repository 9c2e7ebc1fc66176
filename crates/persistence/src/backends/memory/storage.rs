//! Storage trait implementation for the in-memory backend.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::Storage;
use crate::error::{StorageError, StorageResult};
use crate::filter::ResourceFilter;
use crate::types::{AddResult, Pagination, Projection, ResourceQuery, Sort, SortOrder};

use super::MemoryStorage;
use super::document::{self, compare_json};
use super::matcher::{matches, text_score};

#[async_trait]
impl Storage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn default_limit(&self) -> u32 {
        self.config.default_limit
    }

    async fn add(&self, location: &str, resources: Vec<Value>) -> StorageResult<AddResult> {
        if let Some(position) = resources.iter().position(|r| !r.is_object()) {
            return Err(StorageError::invalid_resource(
                location,
                format!("resource at index {} is not a JSON object", position),
            ));
        }

        self.collections
            .write()
            .entry(location.to_string())
            .or_default()
            .extend(resources.iter().cloned());

        tracing::debug!("Inserted {} resource(s) into '{}'", resources.len(), location);

        Ok(AddResult {
            inserted_count: resources.len() as u64,
            resources,
        })
    }

    async fn get(
        &self,
        location: &str,
        query: &ResourceQuery,
    ) -> StorageResult<(Vec<Value>, Pagination)> {
        let limit = query.limit.unwrap_or(self.config.default_limit);
        let page = query.page_index();
        let search = query.filter.as_ref().and_then(|f| f.search_text());
        let score_field = query.sort.score_field();

        if score_field.is_some() && search.is_none() {
            tracing::warn!(
                "Sorting '{}' by relevance without a search operation, every score is 0",
                location
            );
        }

        let collections = self.collections.read();
        let mut matched: Vec<(&Value, f64)> = collections
            .get(location)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|r| query.filter.as_ref().is_none_or(|f| matches(r, f)))
                    .map(|r| (r, search.map_or(0.0, |text| text_score(r, text))))
                    .collect()
            })
            .unwrap_or_default();

        sort_resources(&mut matched, &query.sort);

        let size = matched.len() as u64;
        let pagination = Pagination::new(limit, page, size);
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);

        let resources = matched
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|(resource, score)| {
                let mut projected = document::project(resource, query.fields.as_ref());
                if let (Some(field), Some(_), Value::Object(map)) =
                    (score_field, search, &mut projected)
                {
                    map.insert(field.to_string(), Value::from(score));
                }
                projected
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Fetched {} of {} resource(s) from '{}' (page {})",
            resources.len(),
            size,
            location,
            page
        );

        Ok((resources, pagination))
    }

    async fn get_one(
        &self,
        location: &str,
        filter: Option<&ResourceFilter>,
        fields: Option<&Projection>,
    ) -> StorageResult<Option<Value>> {
        let collections = self.collections.read();
        let found = collections.get(location).and_then(|resources| {
            resources
                .iter()
                .find(|r| filter.is_none_or(|f| matches(r, f)))
        });

        Ok(found.map(|resource| document::project(resource, fields)))
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

        let mut collections = self.collections.write();
        let Some(resource) = collections
            .get_mut(location)
            .and_then(|resources| resources.iter_mut().find(|r| matches(r, filter)))
        else {
            return Ok(0);
        };

        let Value::Object(current) = resource else {
            return Err(StorageError::invalid_resource(
                location,
                "stored resource is not a JSON object",
            ));
        };

        let mut updated = current.clone();
        for (path, value) in data {
            document::set_path(&mut updated, &path, value)
                .map_err(|message| StorageError::invalid_resource(location, message))?;
        }
        *current = updated;

        tracing::debug!("Updated one resource of '{}'", location);
        Ok(1)
    }

    async fn remove(&self, location: &str, filter: &ResourceFilter) -> StorageResult<u64> {
        let mut collections = self.collections.write();
        let Some(resources) = collections.get_mut(location) else {
            return Ok(0);
        };

        let before = resources.len();
        resources.retain(|r| !matches(r, filter));
        let removed = (before - resources.len()) as u64;

        tracing::debug!("Removed {} resource(s) from '{}'", removed, location);
        Ok(removed)
    }

    async fn remove_field(
        &self,
        location: &str,
        field: &str,
        filter: Option<&ResourceFilter>,
    ) -> StorageResult<u64> {
        let mut collections = self.collections.write();
        let Some(resources) = collections.get_mut(location) else {
            return Ok(0);
        };

        let mut modified = 0;
        for resource in resources.iter_mut() {
            if !filter.is_none_or(|f| matches(resource, f)) {
                continue;
            }
            if let Value::Object(map) = resource {
                if document::remove_path(map, field) {
                    modified += 1;
                }
            }
        }

        tracing::debug!(
            "Removed field '{}' from {} resource(s) of '{}'",
            field,
            modified,
            location
        );
        Ok(modified)
    }
}

/// Stable multi-key sort; relevance keys order by descending score.
fn sort_resources(resources: &mut [(&Value, f64)], sort: &Sort) {
    if sort.is_empty() {
        return;
    }

    resources.sort_by(|(a, a_score), (b, b_score)| {
        sort.keys()
            .iter()
            .map(|(field, order)| match order {
                SortOrder::Asc => {
                    compare_json(sort_key(a, field, false), sort_key(b, field, false))
                }
                SortOrder::Desc => {
                    compare_json(sort_key(b, field, true), sort_key(a, field, true))
                }
                SortOrder::Score => b_score.partial_cmp(a_score).unwrap_or(Ordering::Equal),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

static NULL: Value = Value::Null;

/// Value a resource sorts by; arrays sort by their smallest element in
/// ascending order and by their largest in descending order.
fn sort_key<'a>(resource: &'a Value, field: &str, descending: bool) -> &'a Value {
    let mut keys = Vec::new();
    for value in document::lookup(resource, field) {
        match value {
            Value::Array(items) => keys.extend(items.iter()),
            other => keys.push(other),
        }
    }

    let key = if descending {
        keys.into_iter().max_by(|a, b| compare_json(a, b))
    } else {
        keys.into_iter().min_by(|a, b| compare_json(a, b))
    };
    key.unwrap_or(&NULL)
}
