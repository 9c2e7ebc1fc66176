//! Translation of resource filters into MongoDB query documents.

use mongodb::bson::{Bson, Document, doc};

use crate::error::{StorageError, StorageResult};
use crate::filter::{
    ComparisonOperator, FilterValue, LogicalOperator, MembershipOperator, Operation, Operator,
    ResourceFilter,
};
use crate::types::{Projection, Sort, SortOrder};

const BACKEND_NAME: &str = "mongodb";

/// Builds MongoDB query, sort and projection documents.
pub struct MongoQueryBuilder;

impl MongoQueryBuilder {
    /// Translates a filter into a query document.
    ///
    /// Operations on the same field share one sub-document
    /// (`{views: {$gt: 1, $lt: 9}}`). A repeated operator on a field is
    /// moved into the top-level `$and` list.
    ///
    /// # Errors
    ///
    /// * `StorageError::UnsupportedOperator` - For a `search` nested in a
    ///   logical operation; MongoDB only accepts `$text` at the top level
    pub fn build_filter(filter: &ResourceFilter) -> StorageResult<Document> {
        Self::build(filter, true)
    }

    fn build(filter: &ResourceFilter, top_level: bool) -> StorageResult<Document> {
        let mut query = Document::new();

        for operation in filter.operations() {
            match operation {
                Operation::Compare {
                    operator,
                    field,
                    value,
                } => {
                    let key = match operator {
                        ComparisonOperator::Equal => "$eq",
                        ComparisonOperator::NotEqual => "$ne",
                        ComparisonOperator::GreaterThan => "$gt",
                        ComparisonOperator::GreaterThanEqual => "$gte",
                        ComparisonOperator::LesserThan => "$lt",
                        ComparisonOperator::LesserThanEqual => "$lte",
                    };
                    add_condition(&mut query, field, key, to_bson(value));
                }
                Operation::Membership {
                    operator,
                    field,
                    values,
                } => {
                    let key = match operator {
                        MembershipOperator::In => "$in",
                        MembershipOperator::NotIn => "$nin",
                    };
                    let values = values.iter().map(to_bson).collect::<Vec<_>>();
                    add_condition(&mut query, field, key, Bson::Array(values));
                }
                Operation::Exists { field, exists } => {
                    add_condition(&mut query, field, "$exists", Bson::Boolean(*exists));
                }
                Operation::Regex { field, pattern } => {
                    add_condition(
                        &mut query,
                        field,
                        "$regex",
                        Bson::String(pattern.as_str().to_string()),
                    );
                }
                Operation::Logical { operator, filters } => {
                    let key = match operator {
                        LogicalOperator::Or => "$or",
                        LogicalOperator::Nor => "$nor",
                        LogicalOperator::And => "$and",
                    };
                    let nested = filters
                        .iter()
                        .map(|f| Self::build(f, false).map(Bson::Document))
                        .collect::<StorageResult<Vec<_>>>()?;
                    append_list(&mut query, key, nested);
                }
                Operation::Search { text } => {
                    if !top_level {
                        return Err(StorageError::UnsupportedOperator {
                            backend: BACKEND_NAME,
                            operator: Operator::Search,
                            reason: "text search is only allowed at the top level of a query"
                                .to_string(),
                        });
                    }
                    query.insert("$text", doc! { "$search": text.as_str() });
                }
            }
        }

        Ok(query)
    }

    /// Translates sort keys into a sort document.
    ///
    /// Relevance keys sort on `{$meta: "textScore"}`. A field listed twice
    /// keeps its first order.
    ///
    /// # Errors
    ///
    /// * `StorageError::InvalidQuery` - For a relevance key without a search
    pub fn build_sort(sort: &Sort, has_search: bool) -> StorageResult<Document> {
        let mut document = Document::new();

        for (field, order) in sort.keys() {
            if document.contains_key(field) {
                continue;
            }
            let value = match order {
                SortOrder::Asc => Bson::Int32(1),
                SortOrder::Desc => Bson::Int32(-1),
                SortOrder::Score if has_search => Bson::Document(doc! { "$meta": "textScore" }),
                SortOrder::Score => {
                    return Err(StorageError::InvalidQuery {
                        message: format!(
                            "sorting on relevance field '{}' requires a search operation",
                            field
                        ),
                    });
                }
            };
            document.insert(field.as_str(), value);
        }

        Ok(document)
    }

    /// Translates a projection into a projection document.
    ///
    /// `_id` is always excluded unless explicitly included. A `score_field`
    /// projects the text-search relevance under that name.
    pub fn build_projection(fields: Option<&Projection>, score_field: Option<&str>) -> Document {
        let mut document = Document::new();

        match fields {
            Some(Projection::Include(fields)) => {
                for field in fields {
                    document.insert(field.as_str(), 1);
                }
                if !fields.iter().any(|f| f == "_id") {
                    document.insert("_id", 0);
                }
            }
            Some(Projection::Exclude(fields)) => {
                for field in fields {
                    document.insert(field.as_str(), 0);
                }
                document.insert("_id", 0);
            }
            None => {
                document.insert("_id", 0);
            }
        }

        if let Some(field) = score_field {
            document.insert(field, doc! { "$meta": "textScore" });
        }

        document
    }
}

/// Converts a filter value to BSON.
///
/// Dates are sent as epoch milliseconds, the representation resources use
/// for timestamps.
fn to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::String(s) => Bson::String(s.clone()),
        FilterValue::Integer(n) => Bson::Int64(*n),
        FilterValue::Float(n) => Bson::Double(*n),
        FilterValue::Boolean(b) => Bson::Boolean(*b),
        FilterValue::Date(d) => Bson::Int64(d.timestamp_millis()),
    }
}

fn add_condition(query: &mut Document, field: &str, key: &str, value: Bson) {
    match query.get_mut(field) {
        Some(Bson::Document(conditions)) if !conditions.contains_key(key) => {
            conditions.insert(key, value);
        }
        Some(_) => {
            let mut condition = Document::new();
            condition.insert(key, value);
            append_list(query, "$and", vec![Bson::Document(doc! { field: condition })]);
        }
        None => {
            let mut condition = Document::new();
            condition.insert(key, value);
            query.insert(field, condition);
        }
    }
}

fn append_list(query: &mut Document, key: &str, items: Vec<Bson>) {
    match query.get_mut(key) {
        Some(Bson::Array(existing)) => existing.extend(items),
        _ => {
            query.insert(key, items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use regex::Regex;

    fn build(filter: ResourceFilter) -> Document {
        MongoQueryBuilder::build_filter(&filter).unwrap()
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(build(ResourceFilter::new()), Document::new());
    }

    #[test]
    fn test_comparison_operators() {
        let f = ResourceFilter::new();
        assert_eq!(
            build(f.equal("status", "published").unwrap()),
            doc! { "status": { "$eq": "published" } }
        );
        assert_eq!(
            build(f.not_equal("views", 3).unwrap()),
            doc! { "views": { "$ne": 3_i64 } }
        );
        assert_eq!(
            build(f.greater_than("rating", 2.5).unwrap()),
            doc! { "rating": { "$gt": 2.5 } }
        );
        assert_eq!(
            build(f.greater_than_equal("views", 1).unwrap()),
            doc! { "views": { "$gte": 1_i64 } }
        );
        assert_eq!(
            build(f.lesser_than("views", 9).unwrap()),
            doc! { "views": { "$lt": 9_i64 } }
        );
        assert_eq!(
            build(f.lesser_than_equal("published", true).unwrap()),
            doc! { "published": { "$lte": true } }
        );
    }

    #[test]
    fn test_conditions_on_one_field_merge() {
        let filter = ResourceFilter::new()
            .greater_than("views", 1)
            .unwrap()
            .lesser_than("views", 9)
            .unwrap();
        assert_eq!(
            build(filter),
            doc! { "views": { "$gt": 1_i64, "$lt": 9_i64 } }
        );
    }

    #[test]
    fn test_repeated_operator_moves_to_and() {
        let filter = ResourceFilter::new()
            .equal("tags", "a")
            .unwrap()
            .equal("tags", "b")
            .unwrap();
        assert_eq!(
            build(filter),
            doc! {
                "tags": { "$eq": "a" },
                "$and": [ { "tags": { "$eq": "b" } } ],
            }
        );
    }

    #[test]
    fn test_membership_exists_and_regex() {
        let f = ResourceFilter::new();
        assert_eq!(
            build(f.is_in("tag", ["a", "b"]).unwrap()),
            doc! { "tag": { "$in": ["a", "b"] } }
        );
        assert_eq!(
            build(f.not_in("tag", ["c"]).unwrap()),
            doc! { "tag": { "$nin": ["c"] } }
        );
        assert_eq!(
            build(f.exists("deleted", false).unwrap()),
            doc! { "deleted": { "$exists": false } }
        );
        assert_eq!(
            build(f.regex("title", Regex::new("^Rust").unwrap()).unwrap()),
            doc! { "title": { "$regex": "^Rust" } }
        );
    }

    #[test]
    fn test_dates_are_epoch_millis() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let filter = ResourceFilter::new().greater_than("date", date).unwrap();
        assert_eq!(
            build(filter),
            doc! { "date": { "$gt": 1709287200000_i64 } }
        );
    }

    #[test]
    fn test_logical_operators() {
        let owner = |id: &str| ResourceFilter::new().equal("owner", id).unwrap();
        let filter = ResourceFilter::new()
            .or([owner("u1"), owner("u2")])
            .nor([owner("u3")])
            .and([owner("u4")]);

        assert_eq!(
            build(filter),
            doc! {
                "$or": [ { "owner": { "$eq": "u1" } }, { "owner": { "$eq": "u2" } } ],
                "$nor": [ { "owner": { "$eq": "u3" } } ],
                "$and": [ { "owner": { "$eq": "u4" } } ],
            }
        );
    }

    #[test]
    fn test_search_at_top_level() {
        let filter = ResourceFilter::new()
            .search("rust cms")
            .equal("status", "published")
            .unwrap();
        assert_eq!(
            build(filter),
            doc! {
                "$text": { "$search": "rust cms" },
                "status": { "$eq": "published" },
            }
        );
    }

    #[test]
    fn test_nested_search_is_unsupported() {
        let filter = ResourceFilter::new().or([ResourceFilter::new().search("rust")]);
        let err = MongoQueryBuilder::build_filter(&filter).unwrap_err();
        match err {
            StorageError::UnsupportedOperator {
                backend, operator, ..
            } => {
                assert_eq!(backend, "mongodb");
                assert_eq!(operator, Operator::Search);
            }
            other => panic!("expected UnsupportedOperator, got {:?}", other),
        }
    }

    #[test]
    fn test_build_sort() {
        let sort = Sort::new().desc("date").asc("title");
        assert_eq!(
            MongoQueryBuilder::build_sort(&sort, false).unwrap(),
            doc! { "date": -1, "title": 1 }
        );

        let sort = Sort::new().score("score");
        assert_eq!(
            MongoQueryBuilder::build_sort(&sort, true).unwrap(),
            doc! { "score": { "$meta": "textScore" } }
        );
        assert!(matches!(
            MongoQueryBuilder::build_sort(&sort, false),
            Err(StorageError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_build_sort_keeps_first_order_of_a_field() {
        let sort: Sort = serde_json::from_value(serde_json::json!({
            "keys": [["views", "asc"], ["date", "desc"], ["views", "desc"]]
        }))
        .unwrap();
        assert_eq!(
            MongoQueryBuilder::build_sort(&sort, false).unwrap(),
            doc! { "views": 1, "date": -1 }
        );

        let sort = Sort::new().asc("views").desc("views");
        assert_eq!(
            MongoQueryBuilder::build_sort(&sort, false).unwrap(),
            doc! { "views": 1 }
        );
    }

    #[test]
    fn test_build_projection() {
        assert_eq!(
            MongoQueryBuilder::build_projection(None, None),
            doc! { "_id": 0 }
        );
        assert_eq!(
            MongoQueryBuilder::build_projection(Some(&Projection::include(["id", "title"])), None),
            doc! { "id": 1, "title": 1, "_id": 0 }
        );
        assert_eq!(
            MongoQueryBuilder::build_projection(Some(&Projection::include(["_id"])), None),
            doc! { "_id": 1 }
        );
        assert_eq!(
            MongoQueryBuilder::build_projection(Some(&Projection::exclude(["body"])), Some("score")),
            doc! { "body": 0, "_id": 0, "score": { "$meta": "textScore" } }
        );
    }
}
