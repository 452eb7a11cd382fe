//! Reference classification and location handling.
//!
//! Every `$ref` is tagged with a [`RefFormat`] when it is parsed. External
//! references are split into an [`ExternalTarget`]: an absolute document
//! location (joined against the base URI of the document the reference was
//! written in) plus an optional JSON Pointer fragment.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::document::RegistryLayout;
use crate::error::ResolveError;
use crate::pointer::last_segment;

/// Where a reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefFormat {
    /// A pointer into the current document (`#/definitions/Pet`).
    Internal,
    /// A file relative to the current document (`./pet.yaml#/Pet`).
    RelativeFile,
    /// An absolute URL (`https://host/pet.yaml#/Pet`).
    Url,
}

impl RefFormat {
    pub fn is_external(self) -> bool {
        !matches!(self, RefFormat::Internal)
    }
}

const DOCUMENT_EXTENSIONS: &[&str] = &[".json", ".yaml", ".yml"];

/// Classify a raw reference string.
///
/// Bare names such as `Pet` are internal; [`normalize_reference`] expands
/// them to a registry pointer.
pub fn compute_ref_format(reference: &str) -> RefFormat {
    if reference.contains("://") {
        RefFormat::Url
    } else if reference.starts_with('#') {
        RefFormat::Internal
    } else if reference.starts_with('.')
        || reference.starts_with('/')
        || reference.contains('#')
        || DOCUMENT_EXTENSIONS
            .iter()
            .any(|ext| reference.ends_with(ext))
    {
        RefFormat::RelativeFile
    } else {
        RefFormat::Internal
    }
}

/// Classify `reference` and expand a bare definition name into a pointer
/// into the registry of `layout`.
pub fn normalize_reference(reference: String, layout: RegistryLayout) -> (String, RefFormat) {
    let format = compute_ref_format(&reference);
    if format == RefFormat::Internal && !reference.starts_with('#') {
        (layout.local_ref(&reference), format)
    } else {
        (reference, format)
    }
}

/// Identity of an external fragment: document location plus pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub location: String,
    pub fragment: String,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.location, self.fragment)
    }
}

/// A reference split into an absolute location and a fragment pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTarget {
    /// Absolute document location, without fragment.
    pub location: Url,
    /// JSON Pointer inside the document; `None` selects the whole document.
    pub fragment: Option<String>,
}

impl ExternalTarget {
    /// Split `reference` and join its file part against `base`.
    ///
    /// A reference with an empty file part (`#/definitions/Tag`) targets
    /// `base` itself, which is how internal references written inside an
    /// external document are followed.
    pub fn locate(reference: &str, base: &Url) -> Result<Self, ResolveError> {
        let (file, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, Some(fragment)),
            None => (reference, None),
        };

        if fragment.is_some_and(|f| f.contains('#')) {
            return Err(ResolveError::malformed(reference, "more than one `#`"));
        }
        let fragment = match fragment {
            None | Some("") | Some("/") => None,
            Some(f) if f.starts_with('/') => Some(f.to_string()),
            Some(f) => {
                return Err(ResolveError::malformed(
                    reference,
                    format!("fragment `{f}` is not a JSON Pointer"),
                ))
            }
        };

        let mut location = base
            .join(file)
            .map_err(|e| ResolveError::malformed(reference, e.to_string()))?;
        location.set_fragment(None);

        Ok(Self { location, fragment })
    }

    pub fn key(&self) -> TargetKey {
        TargetKey {
            location: self.location.to_string(),
            fragment: self.fragment.clone().unwrap_or_default(),
        }
    }

    /// The reference in absolute form, valid from any document.
    pub fn absolute_reference(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{fragment}", self.location),
            None => self.location.to_string(),
        }
    }

    /// Name the fragment would naturally take in a definitions registry:
    /// the last pointer segment, else the file stem.
    pub fn definition_name(&self) -> Option<String> {
        if let Some(name) = self.fragment.as_deref().and_then(last_segment) {
            return Some(name);
        }
        let file = self.location.path_segments()?.next_back()?;
        let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
        (!stem.is_empty()).then(|| stem.to_string())
    }

    /// Select the fragment from a loaded document.
    pub fn select<'d>(&self, document: &'d Value) -> Result<&'d Value, ResolveError> {
        match self.fragment.as_deref() {
            None => Ok(document),
            Some(fragment) => {
                document
                    .pointer(fragment)
                    .ok_or_else(|| ResolveError::FragmentNotFound {
                        location: self.location.to_string(),
                        fragment: fragment.to_string(),
                    })
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
