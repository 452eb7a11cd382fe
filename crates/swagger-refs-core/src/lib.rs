//! Resolve every `$ref` of a Swagger 2.0 / OpenAPI 3.x document into one
//! self-contained definitions registry.
//!
//! External references (`other.yaml#/definitions/Base`,
//! `https://host/pet.json`) are fetched once per pass, copied into the
//! registry under a collision-free name and rewritten to point at the local
//! copy. Internal references are left alone. A reference that cannot be
//! merged is left as written and reported as a [`ResolveWarning`].
//!
//! ```
//! use swagger_refs_core::{resolve_document, Document, MemoryFetcher, ResolveOptions};
//!
//! let mut document = Document::from_slice(br##"
//! swagger: "2.0"
//! definitions:
//!   Order:
//!     allOf:
//!       - $ref: "other.yaml#/definitions/Base"
//!       - properties:
//!           id: { type: integer }
//! "##).unwrap();
//!
//! let fetcher = MemoryFetcher::new().with(
//!     "file:///other.yaml",
//!     "definitions:\n  Base:\n    type: object\n",
//! );
//! let report = resolve_document(&mut document, &fetcher, &ResolveOptions::default()).unwrap();
//!
//! assert!(report.warnings.is_empty());
//! assert!(document.definitions.contains_key("Base"));
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod pointer;
pub mod ref_utils;
pub mod resolver;
pub mod schema;
pub mod warning;

pub use cache::ResolverCache;
pub use config::ResolveOptions;
pub use document::{Definitions, Document, RegistryLayout};
pub use error::{DocumentError, FetchError, ResolveError};
pub use fetch::{Fetch, FsFetcher, MemoryFetcher};
pub use ref_utils::RefFormat;
pub use resolver::{resolve_document, MergedDefinition, ResolveReport, Resolver};
pub use schema::{Property, RefNode, SchemaNode};
pub use warning::{ResolveWarning, WarningKind};
