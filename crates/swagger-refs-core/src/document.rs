//! Specification documents and their definitions registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::DocumentError;
use crate::pointer::{escape_pointer_segment, unescape_pointer_segment};
use crate::schema::SchemaNode;

/// Named definitions of a document, in declaration order.
pub type Definitions = IndexMap<String, SchemaNode>;

/// Where a document keeps its definitions registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryLayout {
    /// Swagger 2.0: `#/definitions/`.
    Swagger2,
    /// OpenAPI 3.x: `#/components/schemas/`.
    OpenApi3,
}

impl RegistryLayout {
    pub fn prefix(self) -> &'static str {
        match self {
            RegistryLayout::Swagger2 => "#/definitions/",
            RegistryLayout::OpenApi3 => "#/components/schemas/",
        }
    }

    /// Local reference to the definition `name`.
    pub fn local_ref(self, name: &str) -> String {
        format!("{}{}", self.prefix(), escape_pointer_segment(name))
    }

    /// Definition name a local reference points at, if it points directly
    /// at a registry entry.
    pub fn local_name(self, reference: &str) -> Option<String> {
        let segment = reference.strip_prefix(self.prefix())?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(unescape_pointer_segment(segment).into_owned())
    }

    fn detect(root: &Map<String, Value>) -> Self {
        if root.contains_key("definitions") {
            RegistryLayout::Swagger2
        } else if root.contains_key("openapi")
            || root
                .get("components")
                .is_some_and(|c| c.get("schemas").is_some())
        {
            RegistryLayout::OpenApi3
        } else {
            RegistryLayout::Swagger2
        }
    }
}

/// A parsed specification document.
///
/// Only the definitions registry is modeled; every other top-level key is
/// kept verbatim in `rest`, including its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub layout: RegistryLayout,
    pub definitions: Definitions,
    pub rest: Map<String, Value>,
}

impl Document {
    /// Parse YAML or JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(load_value(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let mut rest = match value {
            Value::Object(map) => map,
            other => {
                return Err(DocumentError::NotAMapping {
                    found: kind_of(&other).to_string(),
                })
            }
        };
        let layout = RegistryLayout::detect(&rest);

        // The registry slot stays in `rest` as a placeholder to keep its position.
        let registry = match layout {
            RegistryLayout::Swagger2 => rest.get_mut("definitions").map(Value::take),
            RegistryLayout::OpenApi3 => rest
                .get_mut("components")
                .and_then(|c| c.get_mut("schemas"))
                .map(Value::take),
        };
        let definitions = match registry {
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(name, schema)| (name, SchemaNode::from_value(schema, layout)))
                .collect(),
            _ => Definitions::new(),
        };

        Ok(Self {
            layout,
            definitions,
            rest,
        })
    }

    /// Emit the whole document, registry included.
    pub fn to_value(&self) -> Value {
        let mut root = self.rest.clone();
        let registry: Map<String, Value> = self
            .definitions
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect();

        match self.layout {
            RegistryLayout::Swagger2 => {
                if root.contains_key("definitions") || !registry.is_empty() {
                    root.insert("definitions".to_string(), Value::Object(registry));
                }
            }
            RegistryLayout::OpenApi3 => {
                let has_slot = root
                    .get("components")
                    .is_some_and(|c| c.get("schemas").is_some());
                if has_slot || !registry.is_empty() {
                    let components = root
                        .entry("components")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(components) = components {
                        components.insert("schemas".to_string(), Value::Object(registry));
                    }
                }
            }
        }
        Value::Object(root)
    }
}

/// Parse YAML or JSON bytes into a JSON value.
///
/// YAML mapping keys that are not strings (response codes such as `200:`)
/// are stringified.
pub fn load_value(bytes: &[u8]) -> Result<Value, serde_yaml::Error> {
    let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => yaml_to_json(other).to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_swagger2_round_trip_keeps_key_positions() {
        let raw = json!({
            "swagger": "2.0",
            "definitions": {
                "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
            },
            "paths": {}
        });
        let doc = Document::from_value(raw.clone()).unwrap();
        assert_eq!(doc.layout, RegistryLayout::Swagger2);
        assert_eq!(doc.definitions.len(), 1);

        let emitted = doc.to_value();
        assert_eq!(emitted, raw);
        let keys: Vec<&String> = emitted.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["swagger", "definitions", "paths"]);
    }

    #[test]
    fn test_openapi3_registry_is_components_schemas() {
        let raw = json!({
            "openapi": "3.0.3",
            "components": {
                "responses": {},
                "schemas": { "Pet": { "type": "object" } }
            }
        });
        let doc = Document::from_value(raw.clone()).unwrap();
        assert_eq!(doc.layout, RegistryLayout::OpenApi3);
        assert!(doc.definitions.contains_key("Pet"));
        assert_eq!(doc.to_value(), raw);
    }

    #[test]
    fn test_registry_added_when_absent() {
        let mut doc = Document::from_value(json!({ "swagger": "2.0" })).unwrap();
        assert_eq!(doc.to_value(), json!({ "swagger": "2.0" }));

        doc.definitions.insert(
            "Pet".to_string(),
            SchemaNode::from_value(json!({ "type": "object" }), doc.layout),
        );
        assert_eq!(
            doc.to_value(),
            json!({ "swagger": "2.0", "definitions": { "Pet": { "type": "object" } } })
        );
    }

    #[test]
    fn test_yaml_numeric_keys_are_stringified() {
        let yaml = b"paths:\n  /pets:\n    get:\n      responses:\n        200:\n          description: ok\n";
        let value = load_value(yaml).unwrap();
        assert_eq!(
            value["paths"]["/pets"]["get"]["responses"]["200"]["description"],
            json!("ok")
        );
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = Document::from_slice(b"- just\n- a list\n").unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping { ref found } if found == "array"));
    }

    #[test]
    fn test_local_name() {
        let layout = RegistryLayout::Swagger2;
        assert_eq!(layout.local_name("#/definitions/a~1b").as_deref(), Some("a/b"));
        assert_eq!(layout.local_name("#/definitions/Pet/properties/id"), None);
        assert_eq!(layout.local_name("#/parameters/limit"), None);
        assert_eq!(layout.local_ref("a/b"), "#/definitions/a~1b");
    }
}
