//! Fetch collaborators: how external documents are read.

use std::collections::HashMap;

use url::Url;

use crate::error::FetchError;

/// Reads the raw bytes of an external document.
pub trait Fetch {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(location)
    }
}

/// Reads `file://` locations from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl Fetch for FsFetcher {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, FetchError> {
        if location.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme {
                location: location.to_string(),
                scheme: location.scheme().to_string(),
            });
        }
        let path = location
            .to_file_path()
            .map_err(|()| FetchError::InvalidPath {
                location: location.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "reading external document");
        std::fs::read(&path).map_err(|source| FetchError::Io {
            location: location.to_string(),
            source,
        })
    }
}

/// Serves documents registered in memory, keyed by absolute location.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `contents` at `location` (builder form).
    pub fn with(mut self, location: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(location, contents);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, contents: impl Into<String>) {
        self.documents.insert(location.into(), contents.into());
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, FetchError> {
        self.documents
            .get(location.as_str())
            .map(|contents| contents.clone().into_bytes())
            .ok_or_else(|| FetchError::NotFound {
                location: location.to_string(),
            })
    }
}
