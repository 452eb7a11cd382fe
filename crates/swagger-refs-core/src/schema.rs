//! Schema node model.
//!
//! A definition is one of four [`SchemaNode`] shapes (reference, array,
//! `allOf` composition, object) or an opaque value the permissive parser
//! could not classify. Fields of object schemas are [`Property`]s, which
//! may nest further schema nodes.
//!
//! Keys that carry no references (`type`, `description`, `required`, vendor
//! extensions, ...) are kept verbatim in each node's `extra` map so the
//! document can be emitted again with its original content.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::RegistryLayout;
use crate::ref_utils::{normalize_reference, RefFormat};

/// Keys of a schema object that the model does not interpret.
pub type Extensions = IndexMap<String, Value>;

// ---------------------------------------------------------------------------
// Schema nodes
// ---------------------------------------------------------------------------

/// A parsed schema definition.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Ref(RefNode),
    Array(ArrayNode),
    Composed(ComposedNode),
    Object(ObjectNode),
    /// Anything that is not a schema object (`true`, a bare string, ...).
    Opaque(Value),
}

/// A `$ref` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RefNode {
    pub reference: String,
    pub format: RefFormat,
    /// Sibling keys of `$ref` (e.g. `description`).
    pub extra: Extensions,
}

/// An array schema (`type: array`).
///
/// A `properties` map on an array schema stays in `extra` and is never
/// resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub items: Option<Property>,
    pub extra: Extensions,
}

/// An `allOf` composition: base schema, extension schema and the members
/// in between.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedNode {
    pub parent: Option<Box<SchemaNode>>,
    pub child: Option<Box<SchemaNode>>,
    /// Middle `allOf` members that are references, in declaration order.
    pub interfaces: Vec<RefNode>,
    /// Middle `allOf` members that are inline schemas. Emitted after the
    /// interfaces.
    pub inline: Vec<SchemaNode>,
    pub extra: Extensions,
}

/// An object schema with named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// `None` when the schema declares no `properties` key at all.
    pub properties: Option<IndexMap<String, Property>>,
    pub additional_properties: Option<Box<Property>>,
    pub one_of: Option<Vec<Property>>,
    pub any_of: Option<Vec<Property>>,
    pub not: Option<Box<Property>>,
    pub extra: Extensions,
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// A field descriptor of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Ref(RefNode),
    Array(ArrayProperty),
    Map(MapProperty),
    /// An inline object or `allOf` schema.
    Schema(Box<SchemaNode>),
    /// A scalar field (`string`, `integer`, ...).
    Primitive(Extensions),
    Opaque(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayProperty {
    pub items: Option<Box<Property>>,
    pub extra: Extensions,
}

/// A dictionary field (`additionalProperties: <schema>`).
#[derive(Debug, Clone, PartialEq)]
pub struct MapProperty {
    pub additional_properties: Box<Property>,
    pub extra: Extensions,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn take_string(extra: &mut Extensions, key: &str) -> Option<String> {
    if !extra.get(key).is_some_and(Value::is_string) {
        return None;
    }
    match extra.shift_remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_array(extra: &mut Extensions, key: &str) -> Option<Vec<Value>> {
    if !extra.get(key).is_some_and(Value::is_array) {
        return None;
    }
    match extra.shift_remove(key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn take_object(extra: &mut Extensions, key: &str) -> Option<Map<String, Value>> {
    if !extra.get(key).is_some_and(Value::is_object) {
        return None;
    }
    match extra.shift_remove(key) {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn is_array_schema(extra: &Extensions) -> bool {
    extra.get("type").and_then(Value::as_str) == Some("array") || extra.contains_key("items")
}

impl RefNode {
    /// Build a reference, classifying it and expanding bare names.
    pub fn new(reference: impl Into<String>, layout: RegistryLayout) -> Self {
        Self::with_extra(reference.into(), layout, Extensions::new())
    }

    fn with_extra(reference: String, layout: RegistryLayout, extra: Extensions) -> Self {
        let (reference, format) = normalize_reference(reference, layout);
        Self {
            reference,
            format,
            extra,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("$ref".to_string(), Value::String(self.reference.clone()));
        extend(&mut map, &self.extra);
        Value::Object(map)
    }
}

impl SchemaNode {
    /// Classify a raw schema value. Never fails: unknown shapes become
    /// [`SchemaNode::Opaque`] or an object with no properties.
    pub fn from_value(value: Value, layout: RegistryLayout) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map.into_iter().collect(), layout),
            other => SchemaNode::Opaque(other),
        }
    }

    fn from_map(mut extra: Extensions, layout: RegistryLayout) -> Self {
        if let Some(reference) = take_string(&mut extra, "$ref") {
            return SchemaNode::Ref(RefNode::with_extra(reference, layout, extra));
        }
        if let Some(members) = take_array(&mut extra, "allOf") {
            return SchemaNode::Composed(ComposedNode::from_members(members, extra, layout));
        }
        if is_array_schema(&extra) {
            let items = extra
                .shift_remove("items")
                .map(|items| Property::from_value(items, layout));
            return SchemaNode::Array(ArrayNode { items, extra });
        }
        SchemaNode::Object(ObjectNode::from_extra(extra, layout))
    }

    /// Whether no `$ref` is reachable from this node, in modeled or
    /// verbatim parts alike.
    pub fn is_self_contained(&self) -> bool {
        !contains_ref(&self.to_value())
    }

    /// Emit the node as a schema value.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Ref(node) => node.to_value(),
            SchemaNode::Array(node) => {
                let mut map = Map::new();
                extend(&mut map, &node.extra);
                if let Some(items) = &node.items {
                    map.insert("items".to_string(), items.to_value());
                }
                Value::Object(map)
            }
            SchemaNode::Composed(node) => node.to_value(),
            SchemaNode::Object(node) => node.to_value(),
            SchemaNode::Opaque(value) => value.clone(),
        }
    }
}

impl ComposedNode {
    /// `allOf: [parent, interfaces.., child]`. A single member is the parent.
    fn from_members(members: Vec<Value>, extra: Extensions, layout: RegistryLayout) -> Self {
        let mut composed = ComposedNode {
            parent: None,
            child: None,
            interfaces: Vec::new(),
            inline: Vec::new(),
            extra,
        };

        let mut members = members.into_iter();
        composed.parent = members
            .next()
            .map(|first| Box::new(SchemaNode::from_value(first, layout)));
        composed.child = members
            .next_back()
            .map(|last| Box::new(SchemaNode::from_value(last, layout)));

        for member in members {
            match SchemaNode::from_value(member, layout) {
                SchemaNode::Ref(interface) => composed.interfaces.push(interface),
                inline => composed.inline.push(inline),
            }
        }
        composed
    }

    fn to_value(&self) -> Value {
        let mut members = Vec::new();
        if let Some(parent) = &self.parent {
            members.push(parent.to_value());
        }
        members.extend(self.interfaces.iter().map(RefNode::to_value));
        members.extend(self.inline.iter().map(SchemaNode::to_value));
        if let Some(child) = &self.child {
            members.push(child.to_value());
        }

        let mut map = Map::new();
        extend(&mut map, &self.extra);
        map.insert("allOf".to_string(), Value::Array(members));
        Value::Object(map)
    }
}

impl ObjectNode {
    fn from_extra(mut extra: Extensions, layout: RegistryLayout) -> Self {
        let properties = take_object(&mut extra, "properties").map(|props| {
            props
                .into_iter()
                .map(|(name, value)| (name, Property::from_value(value, layout)))
                .collect()
        });
        let additional_properties = take_object(&mut extra, "additionalProperties")
            .map(|schema| Box::new(Property::from_value(Value::Object(schema), layout)));
        let one_of = take_array(&mut extra, "oneOf").map(|members| properties_of(members, layout));
        let any_of = take_array(&mut extra, "anyOf").map(|members| properties_of(members, layout));
        let not = take_object(&mut extra, "not")
            .map(|schema| Box::new(Property::from_value(Value::Object(schema), layout)));
        Self {
            properties,
            additional_properties,
            one_of,
            any_of,
            not,
            extra,
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        extend(&mut map, &self.extra);
        if let Some(properties) = &self.properties {
            let props = properties
                .iter()
                .map(|(name, property)| (name.clone(), property.to_value()))
                .collect();
            map.insert("properties".to_string(), Value::Object(props));
        }
        if let Some(additional) = &self.additional_properties {
            map.insert("additionalProperties".to_string(), additional.to_value());
        }
        if let Some(members) = &self.one_of {
            map.insert("oneOf".to_string(), values_of(members));
        }
        if let Some(members) = &self.any_of {
            map.insert("anyOf".to_string(), values_of(members));
        }
        if let Some(not) = &self.not {
            map.insert("not".to_string(), not.to_value());
        }
        Value::Object(map)
    }
}

impl Property {
    /// Classify a raw field descriptor.
    pub fn from_value(value: Value, layout: RegistryLayout) -> Self {
        let mut extra: Extensions = match value {
            Value::Object(map) => map.into_iter().collect(),
            other => return Property::Opaque(other),
        };

        if let Some(reference) = take_string(&mut extra, "$ref") {
            return Property::Ref(RefNode::with_extra(reference, layout, extra));
        }
        if ["allOf", "oneOf", "anyOf"]
            .iter()
            .any(|key| extra.get(*key).is_some_and(Value::is_array))
            || ["properties", "not"]
                .iter()
                .any(|key| extra.get(*key).is_some_and(Value::is_object))
        {
            return Property::Schema(Box::new(SchemaNode::from_map(extra, layout)));
        }
        if is_array_schema(&extra) {
            let items = extra
                .shift_remove("items")
                .map(|items| Box::new(Property::from_value(items, layout)));
            return Property::Array(ArrayProperty { items, extra });
        }
        if let Some(schema) = take_object(&mut extra, "additionalProperties") {
            let additional_properties =
                Box::new(Property::from_value(Value::Object(schema), layout));
            return Property::Map(MapProperty {
                additional_properties,
                extra,
            });
        }
        Property::Primitive(extra)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Property::Ref(node) => node.to_value(),
            Property::Array(array) => {
                let mut map = Map::new();
                extend(&mut map, &array.extra);
                if let Some(items) = &array.items {
                    map.insert("items".to_string(), items.to_value());
                }
                Value::Object(map)
            }
            Property::Map(dict) => {
                let mut map = Map::new();
                extend(&mut map, &dict.extra);
                map.insert(
                    "additionalProperties".to_string(),
                    dict.additional_properties.to_value(),
                );
                Value::Object(map)
            }
            Property::Schema(node) => node.to_value(),
            Property::Primitive(extra) => {
                let mut map = Map::new();
                extend(&mut map, extra);
                Value::Object(map)
            }
            Property::Opaque(value) => value.clone(),
        }
    }
}

fn properties_of(members: Vec<Value>, layout: RegistryLayout) -> Vec<Property> {
    members
        .into_iter()
        .map(|member| Property::from_value(member, layout))
        .collect()
}

fn values_of(members: &[Property]) -> Value {
    Value::Array(members.iter().map(Property::to_value).collect())
}

// ---------------------------------------------------------------------------
// References kept verbatim
// ---------------------------------------------------------------------------

impl SchemaNode {
    /// `$ref`s held in keys the model does not interpret, so never
    /// rewritten. The `properties` map of an array schema is skipped.
    pub fn verbatim_refs(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_verbatim_refs(&mut out);
        out
    }

    fn collect_verbatim_refs(&self, out: &mut Vec<String>) {
        match self {
            SchemaNode::Ref(node) => extra_refs(&node.extra, None, out),
            SchemaNode::Array(node) => {
                extra_refs(&node.extra, Some("properties"), out);
                if let Some(items) = &node.items {
                    items.collect_verbatim_refs(out);
                }
            }
            SchemaNode::Composed(node) => {
                extra_refs(&node.extra, None, out);
                for member in node.parent.iter().chain(&node.child) {
                    member.collect_verbatim_refs(out);
                }
                for interface in &node.interfaces {
                    extra_refs(&interface.extra, None, out);
                }
                for member in &node.inline {
                    member.collect_verbatim_refs(out);
                }
            }
            SchemaNode::Object(node) => {
                extra_refs(&node.extra, None, out);
                let properties = node.properties.iter().flat_map(IndexMap::values);
                let alternatives = node.one_of.iter().chain(&node.any_of).flatten();
                let singles = node.additional_properties.iter().chain(&node.not).map(|p| &**p);
                for property in properties.chain(alternatives).chain(singles) {
                    property.collect_verbatim_refs(out);
                }
            }
            SchemaNode::Opaque(value) => collect_refs(value, out),
        }
    }
}

impl Property {
    fn collect_verbatim_refs(&self, out: &mut Vec<String>) {
        match self {
            Property::Ref(node) => extra_refs(&node.extra, None, out),
            Property::Array(array) => {
                extra_refs(&array.extra, None, out);
                if let Some(items) = &array.items {
                    items.collect_verbatim_refs(out);
                }
            }
            Property::Map(map) => {
                extra_refs(&map.extra, None, out);
                map.additional_properties.collect_verbatim_refs(out);
            }
            Property::Schema(node) => node.collect_verbatim_refs(out),
            Property::Primitive(extra) => extra_refs(extra, None, out),
            Property::Opaque(value) => collect_refs(value, out),
        }
    }
}

fn extra_refs(extra: &Extensions, skip: Option<&str>, out: &mut Vec<String>) {
    for (key, value) in extra {
        if Some(key.as_str()) != skip {
            collect_refs(value, out);
        }
    }
}

fn collect_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                out.push(reference.clone());
            }
            map.values().for_each(|v| collect_refs(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

fn extend(map: &mut Map<String, Value>, extra: &Extensions) {
    for (key, value) in extra {
        map.insert(key.clone(), value.clone());
    }
}

// ===========================================================================
// Tests
// ===========================================================================
