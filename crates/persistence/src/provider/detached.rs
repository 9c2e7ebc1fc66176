//! Fire-and-forget variants of the provider's mutations.

use std::fmt;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::core::Storage;
use crate::filter::ResourceFilter;

use super::EntityProvider;

/// Runs mutations in the background and reports their errors to the
/// provider's [`ErrorSink`](super::ErrorSink).
///
/// Every method spawns a Tokio task and must be called from within a
/// runtime. The returned handle may be dropped; the task keeps running.
pub struct DetachedProvider<S: Storage + ?Sized + 'static> {
    provider: EntityProvider<S>,
}

impl<S: Storage + ?Sized + 'static> DetachedProvider<S> {
    pub(super) fn new(provider: EntityProvider<S>) -> Self {
        Self { provider }
    }

    /// The provider operations are delegated to.
    pub fn provider(&self) -> &EntityProvider<S> {
        &self.provider
    }

    /// Adds entities in the background.
    pub fn add(&self, entities: Vec<Value>) -> JoinHandle<()> {
        let provider = self.provider.clone();
        tokio::spawn(async move {
            if let Err(e) = provider.add(entities).await {
                provider.report("add", &e);
            }
        })
    }

    /// Updates one entity in the background.
    pub fn update_one(&self, filter: ResourceFilter, data: Map<String, Value>) -> JoinHandle<()> {
        let provider = self.provider.clone();
        tokio::spawn(async move {
            if let Err(e) = provider.update_one(&filter, data).await {
                provider.report("update_one", &e);
            }
        })
    }

    /// Removes entities in the background.
    pub fn remove(&self, filter: ResourceFilter) -> JoinHandle<()> {
        let provider = self.provider.clone();
        tokio::spawn(async move {
            if let Err(e) = provider.remove(&filter).await {
                provider.report("remove", &e);
            }
        })
    }

    /// Removes a field from entities in the background.
    pub fn remove_field(
        &self,
        field: impl Into<String>,
        filter: Option<ResourceFilter>,
    ) -> JoinHandle<()> {
        let provider = self.provider.clone();
        let field = field.into();
        tokio::spawn(async move {
            if let Err(e) = provider.remove_field(&field, filter.as_ref()).await {
                provider.report("remove_field", &e);
            }
        })
    }
}

impl<S: Storage + ?Sized + 'static> Clone for DetachedProvider<S> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<S: Storage + ?Sized + 'static> fmt::Debug for DetachedProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachedProvider")
            .field("provider", &self.provider)
            .finish()
    }
}
