//! Content read from local files

use async_trait::async_trait;
use scr_state::{ContentSource, FetchError};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// [`ContentSource`] mapping source ids to files
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    files: HashMap<String, PathBuf>,
}

impl FileSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a file registered under `source_id`
    #[must_use]
    pub fn with_file(mut self, source_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(source_id.into(), path.into());
        self
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch(&self, source_id: &str) -> Result<String, FetchError> {
        let path = self
            .files
            .get(source_id)
            .ok_or_else(|| FetchError::NotFound(source_id.to_string()))?;

        tokio::fs::read_to_string(path).await.map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(source_id.to_string()),
            _ => FetchError::unavailable(source_id, format!("{}: {err}", path.display())),
        })
    }
}
