//! Error types for reference resolution and document loading.

use thiserror::Error;

/// A per-reference failure.
///
/// These are absorbed at the external reference boundary and reported as
/// [`ResolveWarning`](crate::ResolveWarning)s; they never abort a pass.
/// Messages are stringified so failed loads can be cached and replayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Malformed reference {reference}: {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("Failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("Failed to parse {location}: {message}")]
    Parse { location: String, message: String },

    #[error("Fragment {fragment} not found in {location}")]
    FragmentNotFound { location: String, fragment: String },

    #[error("Invalid base URI {uri}: {reason}")]
    InvalidBaseUri { uri: String, reason: String },
}

impl ResolveError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        ResolveError::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of the fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("I/O error reading {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported scheme `{scheme}` for {location}")]
    UnsupportedScheme { location: String, scheme: String },

    #[error("No document registered at {location}")]
    NotFound { location: String },

    #[error("{location} does not map to a local file path")]
    InvalidPath { location: String },
}

/// Failure to turn raw bytes into a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("YAML/JSON parsing error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Document root must be a mapping (found: {found})")]
    NotAMapping { found: String },
}

// ===========================================================================
// Tests
// ===========================================================================
