//! Warnings collected during a resolution pass.

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// A reference that was left unresolved, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveWarning {
    /// The reference exactly as written in the schema node.
    pub reference: String,
    /// Classification of the warning.
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of resolution warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarningKind {
    /// The reference could not be split into location and fragment.
    MalformedReference,
    /// The external resource could not be fetched.
    FetchFailed { location: String },
    /// The external resource is not a YAML/JSON document.
    ParseFailed { location: String },
    /// The external document has no node at the fragment.
    FragmentNotFound { location: String, fragment: String },
    /// A local reference names a definition missing from the registry.
    DanglingReference { name: String },
    /// Traversal stopped at the configured depth limit.
    DepthExceeded { max_depth: usize },
    /// A merged fragment keeps a `$ref` under a keyword that is not
    /// resolved (e.g. `patternProperties`).
    UnmodeledReference { location: String },
}

impl ResolveWarning {
    /// Wrap an absorbed per-reference error.
    pub fn unresolved(reference: &str, error: &ResolveError) -> Self {
        let kind = match error {
            ResolveError::MalformedReference { .. } | ResolveError::InvalidBaseUri { .. } => {
                WarningKind::MalformedReference
            }
            ResolveError::Fetch { location, .. } => WarningKind::FetchFailed {
                location: location.clone(),
            },
            ResolveError::Parse { location, .. } => WarningKind::ParseFailed {
                location: location.clone(),
            },
            ResolveError::FragmentNotFound { location, fragment } => {
                WarningKind::FragmentNotFound {
                    location: location.clone(),
                    fragment: fragment.clone(),
                }
            }
        };
        Self {
            reference: reference.to_string(),
            kind,
            message: error.to_string(),
        }
    }

    pub(crate) fn dangling(reference: &str, name: &str) -> Self {
        Self {
            reference: reference.to_string(),
            kind: WarningKind::DanglingReference {
                name: name.to_string(),
            },
            message: format!("No definition named `{name}` for {reference}"),
        }
    }

    pub(crate) fn unmodeled(reference: &str, location: &str) -> Self {
        Self {
            reference: reference.to_string(),
            kind: WarningKind::UnmodeledReference {
                location: location.to_string(),
            },
            message: format!(
                "Reference {reference} merged from {location} sits under a keyword that is not resolved"
            ),
        }
    }

    pub(crate) fn depth_exceeded(location: &str, max_depth: usize) -> Self {
        Self {
            reference: location.to_string(),
            kind: WarningKind::DepthExceeded { max_depth },
            message: format!("Schema nesting in {location} exceeds max depth {max_depth}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_warning_kind_is_tagged() {
        let warning = ResolveWarning::unresolved(
            "other.yaml#/definitions/Gone",
            &ResolveError::FragmentNotFound {
                location: "file:///other.yaml".to_string(),
                fragment: "/definitions/Gone".to_string(),
            },
        );
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"]["type"], json!("fragment_not_found"));
        assert_eq!(value["kind"]["fragment"], json!("/definitions/Gone"));
        assert_eq!(value["reference"], json!("other.yaml#/definitions/Gone"));
    }

    #[test]
    fn test_unmodeled_reference_names_source() {
        let warning = ResolveWarning::unmodeled("#/definitions/Cat", "file:///pets.yaml");
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"]["type"], json!("unmodeled_reference"));
        assert_eq!(value["kind"]["location"], json!("file:///pets.yaml"));
        assert!(warning.message.contains("#/definitions/Cat"));
    }
}
