//! Content sources
//!
//! Fetching lives outside the state machine. A [`ContentSource`] is the
//! external collaborator that turns a source id into untrusted markup, or a
//! [`FetchError`].

use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Supplier of untrusted content
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw markup for `source_id`
    async fn fetch(&self, source_id: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    async fn fetch(&self, source_id: &str) -> Result<String, FetchError> {
        (**self).fetch(source_id).await
    }
}

/// In-memory source, for content passed in directly
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: HashMap<String, String>,
}

impl StaticSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an entry
    #[must_use]
    pub fn with_entry(mut self, source_id: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.insert(source_id.into(), content.into());
        self
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch(&self, source_id: &str) -> Result<String, FetchError> {
        self.entries
            .get(source_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(source_id.to_string()))
    }
}
