//! Observers of errors raised by detached operations.

use crate::error::StorageError;

/// Receives the errors of operations nobody awaits.
///
/// [`DetachedProvider`](super::DetachedProvider) reports every failure here
/// instead of returning it.
pub trait ErrorSink: Send + Sync {
    /// Reports the failure of `operation` on `location`.
    fn report(&self, location: &str, operation: &'static str, error: &StorageError);
}

/// Default sink: emits a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, location: &str, operation: &'static str, error: &StorageError) {
        tracing::error!(
            "Detached {} on location '{}' failed: {}",
            operation,
            location,
            error
        );
    }
}
