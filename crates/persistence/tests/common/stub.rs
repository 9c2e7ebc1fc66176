//! Scripted storage recording every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use cms_persistence::core::Storage;
use cms_persistence::error::{BackendError, StorageError, StorageResult};
use cms_persistence::filter::ResourceFilter;
use cms_persistence::provider::ErrorSink;
use cms_persistence::types::{AddResult, Pagination, Projection, ResourceQuery};

type PageFn = Box<dyn Fn(u32) -> StorageResult<(Vec<Value>, Pagination)> + Send + Sync>;

/// A call received by [`StubStorage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add { location: String, count: usize },
    Get { location: String, page: u32, limit: Option<u32> },
    GetOne { location: String },
    UpdateOne { location: String, keys: Vec<String> },
    Remove { location: String },
    RemoveField { location: String, field: String },
}

/// Storage whose `get` answers are scripted per page.
pub struct StubStorage {
    calls: Mutex<Vec<Call>>,
    pages: PageFn,
    failing: bool,
}

impl StubStorage {
    /// A stub answering every `get` with an empty result.
    pub fn new() -> Self {
        Self::with_pages(|page| Ok((Vec::new(), Pagination::new(10, page, 0))))
    }

    /// A stub answering `get` with `pages(page)`.
    pub fn with_pages<F>(pages: F) -> Self
    where
        F: Fn(u32) -> StorageResult<(Vec<Value>, Pagination)> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            pages: Box::new(pages),
            failing: false,
        }
    }

    /// A stub serving `size` entities `{"index": n}` in pages of `limit`.
    pub fn paged(size: u64, limit: u32) -> Self {
        Self::with_pages(move |page| {
            let start = u64::from(page) * u64::from(limit);
            let end = (start + u64::from(limit)).min(size);
            let entities = (start..end).map(|n| json!({"index": n})).collect();
            Ok((entities, Pagination::new(limit, page, size)))
        })
    }

    /// Makes every mutation fail with [`unavailable`].
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Page indexes requested through `get`, in order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Get { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> StorageResult<()> {
        self.calls.lock().push(call);
        if self.failing {
            return Err(unavailable());
        }
        Ok(())
    }
}

/// The error returned by a failing stub.
pub fn unavailable() -> StorageError {
    StorageError::Backend(BackendError::Unavailable {
        backend_name: "stub".to_string(),
        message: "scripted failure".to_string(),
    })
}

#[async_trait]
impl Storage for StubStorage {
    fn backend_name(&self) -> &'static str {
        "stub"
    }

    async fn add(&self, location: &str, resources: Vec<Value>) -> StorageResult<AddResult> {
        self.record(Call::Add {
            location: location.to_string(),
            count: resources.len(),
        })?;
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
        self.calls.lock().push(Call::Get {
            location: location.to_string(),
            page: query.page_index(),
            limit: query.limit,
        });
        (self.pages)(query.page_index())
    }

    async fn get_one(
        &self,
        location: &str,
        _filter: Option<&ResourceFilter>,
        _fields: Option<&Projection>,
    ) -> StorageResult<Option<Value>> {
        self.record(Call::GetOne {
            location: location.to_string(),
        })?;
        Ok(None)
    }

    async fn update_one(
        &self,
        location: &str,
        _filter: &ResourceFilter,
        data: Map<String, Value>,
    ) -> StorageResult<u64> {
        self.record(Call::UpdateOne {
            location: location.to_string(),
            keys: data.keys().cloned().collect(),
        })?;
        Ok(1)
    }

    async fn remove(&self, location: &str, _filter: &ResourceFilter) -> StorageResult<u64> {
        self.record(Call::Remove {
            location: location.to_string(),
        })?;
        Ok(2)
    }

    async fn remove_field(
        &self,
        location: &str,
        field: &str,
        _filter: Option<&ResourceFilter>,
    ) -> StorageResult<u64> {
        self.record(Call::RemoveField {
            location: location.to_string(),
            field: field.to_string(),
        })?;
        Ok(3)
    }
}

/// A report received by [`RecordingErrorSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub location: String,
    pub operation: &'static str,
    pub message: String,
}

/// Error sink keeping every report.
#[derive(Default)]
pub struct RecordingErrorSink {
    reports: Mutex<Vec<Report>>,
}

impl RecordingErrorSink {
    /// Reports received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }
}

impl ErrorSink for RecordingErrorSink {
    fn report(&self, location: &str, operation: &'static str, error: &StorageError) {
        self.reports.lock().push(Report {
            location: location.to_string(),
            operation,
            message: error.to_string(),
        });
    }
}
