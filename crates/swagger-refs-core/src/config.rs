//! Configuration for a resolution pass.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ResolveError;

/// Base URI assumed for a root document that was not loaded from a known location.
pub const DEFAULT_BASE_URI: &str = "file:///swagger.yaml";

/// Options for a resolution pass.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `base-uri`, `max-depth`).
/// Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolveOptions {
    /// Location of the root document. Relative references are joined against
    /// it. Default: `file:///swagger.yaml`.
    pub base_uri: Option<String>,
    /// Maximum nesting depth of the traversal (stack overflow guard). Deeper
    /// subtrees are left untouched and reported.
    pub max_depth: usize,
    /// Reuse an existing definition that is structurally identical to an
    /// incoming external one instead of adding a suffixed copy.
    pub reuse_identical: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            base_uri: None,
            max_depth: 64,
            reuse_identical: true,
        }
    }
}

impl ResolveOptions {
    /// The root document location, without fragment.
    pub fn root_uri(&self) -> Result<Url, ResolveError> {
        let raw = self.base_uri.as_deref().unwrap_or(DEFAULT_BASE_URI);
        let mut url = Url::parse(raw).map_err(|e| ResolveError::InvalidBaseUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;
        url.set_fragment(None);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_options_serde_round_trip() {
        let opts = ResolveOptions {
            base_uri: Some("https://api.example.com/v1/swagger.yaml".to_string()),
            max_depth: 12,
            reuse_identical: false,
        };

        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"base-uri\""));
        assert!(json.contains("\"max-depth\""));
        assert!(json.contains("\"reuse-identical\""));

        let deserialized: ResolveOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, opts);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let opts: ResolveOptions = serde_json::from_str(r#"{"max-depth": 3}"#).unwrap();
        assert_eq!(opts.max_depth, 3);
        assert!(opts.reuse_identical);
        assert_eq!(opts.base_uri, None);
    }

    #[test]
    fn test_root_uri_drops_fragment() {
        let opts = ResolveOptions {
            base_uri: Some("file:///specs/api.yaml#/definitions".to_string()),
            ..ResolveOptions::default()
        };
        assert_eq!(opts.root_uri().unwrap().as_str(), "file:///specs/api.yaml");
    }

    #[test]
    fn test_root_uri_rejects_relative_base() {
        let opts = ResolveOptions {
            base_uri: Some("specs/api.yaml".to_string()),
            ..ResolveOptions::default()
        };
        assert!(matches!(
            opts.root_uri(),
            Err(ResolveError::InvalidBaseUri { .. })
        ));
    }
}
