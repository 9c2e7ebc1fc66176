//! Entity provider integration tests.
//!
//! These tests drive [`EntityProvider`] against a scripted storage to check
//! the behavior the provider adds on top of the storage contract.

mod common;

use std::sync::Arc;

use serde_json::{Map, json};

use cms_persistence::error::StorageError;
use cms_persistence::filter::ResourceFilter;
use cms_persistence::provider::EntityProvider;
use cms_persistence::types::{Pagination, ResourceQuery, Sort};

use common::{Call, RecordingErrorSink, StubStorage, unavailable};

fn provider(storage: StubStorage) -> (Arc<StubStorage>, EntityProvider<StubStorage>) {
    let storage = Arc::new(storage);
    let provider = EntityProvider::new(Arc::clone(&storage), "videos");
    (storage, provider)
}

// ============================================================================
// Pass-through Tests
// ============================================================================

#[tokio::test]
async fn test_calls_use_bound_location() {
    let (storage, provider) = provider(StubStorage::new());
    let filter = ResourceFilter::new().equal("id", "1").unwrap();

    let mut data = Map::new();
    data.insert("title".to_string(), json!("New"));

    assert_eq!(provider.location(), "videos");
    assert!(provider.get_one(Some(&filter), None).await.unwrap().is_none());
    provider.get(&ResourceQuery::new().with_page(3)).await.unwrap();
    assert_eq!(provider.update_one(&filter, data).await.unwrap(), 1);
    assert_eq!(provider.remove(&filter).await.unwrap(), 2);
    assert_eq!(provider.remove_field("tags", None).await.unwrap(), 3);

    assert_eq!(
        storage.calls(),
        vec![
            Call::GetOne {
                location: "videos".to_string()
            },
            Call::Get {
                location: "videos".to_string(),
                page: 3,
                limit: None
            },
            Call::UpdateOne {
                location: "videos".to_string(),
                keys: vec!["title".to_string()]
            },
            Call::Remove {
                location: "videos".to_string()
            },
            Call::RemoveField {
                location: "videos".to_string(),
                field: "tags".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_errors_pass_through_unchanged() {
    let (_, provider) = provider(StubStorage::new().failing());
    let filter = ResourceFilter::new().equal("id", "1").unwrap();

    let err = provider.remove(&filter).await.unwrap_err();
    assert_eq!(err.to_string(), unavailable().to_string());
}

// ============================================================================
// Add Tests
// ============================================================================

#[tokio::test]
async fn test_add_empty_skips_storage() {
    let (storage, provider) = provider(StubStorage::new());

    let result = provider.add(vec![]).await.unwrap();

    assert_eq!(result.inserted_count, 0);
    assert!(result.resources.is_empty());
    assert!(storage.calls().is_empty());
}

#[tokio::test]
async fn test_add_forwards_entities() {
    let (storage, provider) = provider(StubStorage::new());

    let result = provider
        .add(vec![json!({"id": "1"}), json!({"id": "2"})])
        .await
        .unwrap();

    assert_eq!(result.inserted_count, 2);
    assert_eq!(
        storage.calls(),
        vec![Call::Add {
            location: "videos".to_string(),
            count: 2
        }]
    );
}

// ============================================================================
// Get All Tests
// ============================================================================

#[tokio::test]
async fn test_get_all_walks_every_page() {
    let (storage, provider) = provider(StubStorage::paged(25, 10));

    let entities = provider.get_all(None, None, Sort::new()).await.unwrap();

    assert_eq!(entities.len(), 25);
    assert_eq!(entities[0], json!({"index": 0}));
    assert_eq!(entities[24], json!({"index": 24}));
    assert_eq!(storage.requested_pages(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_get_all_uses_backend_default_limit() {
    let (storage, provider) = provider(StubStorage::paged(3, 10));

    provider.get_all(None, None, Sort::new()).await.unwrap();

    assert!(storage
        .calls()
        .iter()
        .all(|call| matches!(call, Call::Get { limit: None, .. })));
}

#[tokio::test]
async fn test_get_all_follows_reported_page_count() {
    let (storage, provider) = provider(StubStorage::with_pages(|_| {
        Ok((
            vec![json!({})],
            Pagination {
                limit: 10,
                page: 2,
                pages: 5,
                size: 47,
            },
        ))
    }));

    let entities = provider.get_all(None, None, Sort::new()).await.unwrap();

    assert_eq!(storage.requested_pages(), vec![0, 1, 2, 3, 4]);
    assert_eq!(entities.len(), 5);
}

#[tokio::test]
async fn test_get_all_without_results_requests_one_page() {
    let (storage, provider) = provider(StubStorage::new());

    let entities = provider.get_all(None, None, Sort::new()).await.unwrap();

    assert!(entities.is_empty());
    assert_eq!(storage.requested_pages(), vec![0]);
}

#[tokio::test]
async fn test_get_all_stops_on_first_error() {
    let (storage, provider) = provider(StubStorage::with_pages(|page| {
        if page == 1 {
            return Err(StorageError::InvalidQuery {
                message: "page 1 failed".to_string(),
            });
        }
        Ok((vec![json!({"page": page})], Pagination::new(1, page, 3)))
    }));

    let err = provider.get_all(None, None, Sort::new()).await.unwrap_err();

    assert!(matches!(err, StorageError::InvalidQuery { .. }));
    assert_eq!(storage.requested_pages(), vec![0, 1]);
}

#[tokio::test]
async fn test_get_all_rejects_matches_without_pages() {
    let (storage, provider) = provider(StubStorage::with_pages(|page| {
        Ok((Vec::new(), Pagination::new(0, page, 3)))
    }));

    let err = provider.get_all(None, None, Sort::new()).await.unwrap_err();

    match err {
        StorageError::InvalidQuery { message } => {
            assert!(message.contains("stub"));
            assert!(message.contains("'videos'"));
        }
        other => panic!("expected InvalidQuery, got {:?}", other),
    }
    assert_eq!(storage.requested_pages(), vec![0]);
}

// ============================================================================
// Detached Tests
// ============================================================================

#[tokio::test]
async fn test_detached_errors_reach_sink() {
    let sink = Arc::new(RecordingErrorSink::default());
    let (_, provider) = provider(StubStorage::new().failing());
    let provider = provider.with_error_sink(sink.clone());
    let detached = provider.detach();
    let filter = ResourceFilter::new().equal("id", "1").unwrap();

    detached.add(vec![json!({"id": "1"})]).await.unwrap();
    detached.remove(filter.clone()).await.unwrap();
    detached.update_one(filter, Map::new()).await.unwrap();
    detached.remove_field("tags", None).await.unwrap();

    let reports = sink.reports();
    let operations: Vec<&str> = reports.iter().map(|r| r.operation).collect();
    assert_eq!(operations, vec!["add", "remove", "update_one", "remove_field"]);
    assert!(reports.iter().all(|r| r.location == "videos"));
    assert_eq!(reports[0].message, unavailable().to_string());
}

#[tokio::test]
async fn test_detached_success_reports_nothing() {
    let sink = Arc::new(RecordingErrorSink::default());
    let (storage, provider) = provider(StubStorage::new());
    let detached = provider.with_error_sink(sink.clone()).detach();

    detached.remove_field("tags", None).await.unwrap();

    assert!(sink.reports().is_empty());
    assert_eq!(storage.calls().len(), 1);
}

#[tokio::test]
async fn test_detached_empty_add_skips_storage() {
    let sink = Arc::new(RecordingErrorSink::default());
    let (storage, provider) = provider(StubStorage::new().failing());
    let detached = provider.with_error_sink(sink.clone()).detach();

    detached.add(vec![]).await.unwrap();

    assert!(storage.calls().is_empty());
    assert!(sink.reports().is_empty());
}
