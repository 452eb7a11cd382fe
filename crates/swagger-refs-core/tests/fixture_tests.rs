//! End-to-end tests over multi-file fixtures read from disk with `FsFetcher`.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swagger_refs_core::{resolve_document, Document, FsFetcher, ResolveOptions, WarningKind};
use url::Url;

// ── Helpers ─────────────────────────────────────────────────────────────────

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    fs::canonicalize(Path::new(FIXTURES_DIR).join(name))
        .unwrap_or_else(|e| panic!("Missing fixture {name}: {e}"))
}

fn load_fixture(name: &str) -> (Document, ResolveOptions) {
    let path = fixture_path(name);
    let bytes = fs::read(&path).unwrap_or_else(|e| panic!("Failed to read {name}: {e}"));
    let document =
        Document::from_slice(&bytes).unwrap_or_else(|e| panic!("Failed to parse {name}: {e}"));
    let options = ResolveOptions {
        base_uri: Some(Url::from_file_path(&path).unwrap().to_string()),
        ..ResolveOptions::default()
    };
    (document, options)
}

/// Collect every `$ref` string in the emitted document.
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

// ── Petstore (Swagger 2.0) ──────────────────────────────────────────────────

#[test]
fn test_petstore_becomes_self_contained() {
    let (mut document, options) = load_fixture("petstore/swagger.yaml");

    let report = resolve_document(&mut document, &FsFetcher, &options).unwrap();

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.fetches, 2);

    let names: Vec<&str> = document.definitions.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["Pet", "Owner", "Species", "Tag", "Animal", "Timestamped", "Address"]
    );

    let emitted = document.to_value();
    let mut refs = Vec::new();
    collect_refs(&emitted, &mut refs);
    for reference in &refs {
        assert!(
            reference.starts_with("#/definitions/"),
            "unresolved reference left behind: {reference}"
        );
        let name = reference.trim_start_matches("#/definitions/");
        assert!(
            document.definitions.contains_key(name),
            "{reference} does not point at a definition"
        );
    }
}

#[test]
fn test_petstore_rewrites_and_keeps_structure() {
    let (mut document, options) = load_fixture("petstore/swagger.yaml");
    resolve_document(&mut document, &FsFetcher, &options).unwrap();

    let emitted = document.to_value();
    let defs = &emitted["definitions"];

    assert_eq!(
        defs["Pet"]["allOf"],
        json!([
            { "$ref": "#/definitions/Animal" },
            { "$ref": "#/definitions/Timestamped" },
            {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "owner": { "$ref": "#/definitions/Owner" }
                }
            }
        ])
    );
    assert_eq!(defs["Animal"]["properties"]["species"]["$ref"], json!("#/definitions/Species"));
    assert_eq!(defs["Animal"]["properties"]["tags"]["items"]["$ref"], json!("#/definitions/Tag"));
    assert_eq!(defs["Species"]["enum"], json!(["cat", "dog"]));

    // Untouched parts of the document survive, response codes included.
    assert_eq!(
        emitted["paths"]["/pets"]["get"]["responses"]["200"]["schema"]["items"]["$ref"],
        json!("#/definitions/Pet")
    );
    let top: Vec<&String> = emitted.as_object().unwrap().keys().collect();
    assert_eq!(top, vec!["swagger", "info", "paths", "definitions"]);
}

// ── OpenAPI 3 ───────────────────────────────────────────────────────────────

#[test]
fn test_openapi3_whole_document_reference_and_missing_file() {
    let (mut document, options) = load_fixture("openapi3/openapi.yaml");

    let report = resolve_document(&mut document, &FsFetcher, &options).unwrap();

    let emitted = document.to_value();
    let schemas = &emitted["components"]["schemas"];
    assert_eq!(schemas["UserList"]["items"]["$ref"], json!("#/components/schemas/User"));
    assert_eq!(
        schemas["User"]["properties"]["manager"]["$ref"],
        json!("#/components/schemas/User")
    );

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].reference, "./schemas/missing.yaml#/Nope");
    assert!(matches!(
        report.warnings[0].kind,
        WarningKind::FetchFailed { .. }
    ));
    assert_eq!(schemas["Broken"]["$ref"], json!("./schemas/missing.yaml#/Nope"));
}
