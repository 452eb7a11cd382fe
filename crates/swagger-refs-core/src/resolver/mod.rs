//! The reference resolution engine.
//!
//! [`Resolver`] walks schema nodes and their properties, and merges every
//! external fragment it meets into the definitions registry exactly once:
//!
//! - [`model`] dispatches on the node variant.
//! - [`property`] descends into field descriptors.
//! - [`external`] fetches, names, resolves and inserts external fragments.
//!
//! All three are `impl Resolver` blocks because they recurse into each
//! other and share the same registry and cache borrows.

mod external;
mod model;
mod property;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::cache::ResolverCache;
use crate::config::ResolveOptions;
use crate::document::{Definitions, Document, RegistryLayout};
use crate::error::ResolveError;
use crate::fetch::Fetch;
use crate::schema::SchemaNode;
use crate::warning::ResolveWarning;

/// The document a node was read from. Internal references are relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
    /// The root document; its internal references are already local.
    Root,
    /// An external document merged into the root registry.
    External(Url),
}

impl Scope {
    fn base<'s>(&'s self, root: &'s Url) -> &'s Url {
        match self {
            Scope::Root => root,
            Scope::External(location) => location,
        }
    }
}

/// An external fragment copied into the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDefinition {
    /// Absolute `location#fragment` of the source.
    pub source: String,
    /// Name it received in the registry.
    pub local_name: String,
}

/// Outcome of [`resolve_document`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// References left unresolved, in discovery order.
    pub warnings: Vec<ResolveWarning>,
    /// External fragments added to the registry, in insertion order.
    pub merged: Vec<MergedDefinition>,
    /// External documents fetched (attempts, including failures).
    pub fetches: usize,
}

/// Resolution context over one definitions registry.
///
/// The registry is only ever added to. Per-reference failures never
/// surface as errors; they are collected as [`ResolveWarning`]s.
pub struct Resolver<'a, 'f> {
    definitions: &'a mut Definitions,
    layout: RegistryLayout,
    cache: &'a mut ResolverCache<'f>,
    options: &'a ResolveOptions,
    warnings: Vec<ResolveWarning>,
    merged: Vec<MergedDefinition>,
}

impl<'a, 'f> Resolver<'a, 'f> {
    pub fn new(
        definitions: &'a mut Definitions,
        layout: RegistryLayout,
        cache: &'a mut ResolverCache<'f>,
        options: &'a ResolveOptions,
    ) -> Self {
        Self {
            definitions,
            layout,
            cache,
            options,
            warnings: Vec::new(),
            merged: Vec::new(),
        }
    }

    /// Resolve every definition present when the call starts, in
    /// declaration order. Definitions merged along the way are already
    /// resolved when they are inserted.
    pub fn resolve_definitions(&mut self) {
        let count = self.definitions.len();
        for index in 0..count {
            // Take the node out so the registry stays mutable while it is
            // walked; the placeholder keeps its name occupied.
            let Some((name, slot)) = self.definitions.get_index_mut(index) else {
                break;
            };
            tracing::trace!(definition = %name, "resolving definition");
            let mut node = std::mem::replace(slot, SchemaNode::Opaque(Value::Null));

            self.resolve(Some(&mut node));

            if let Some((_, slot)) = self.definitions.get_index_mut(index) {
                *slot = node;
            }
        }
    }

    /// External fragments added so far, in insertion order.
    pub fn merged(&self) -> &[MergedDefinition] {
        &self.merged
    }

    pub fn into_warnings(self) -> Vec<ResolveWarning> {
        self.warnings
    }

    /// Returns `false` (and reports) when `depth` is past the limit.
    fn enter(&mut self, depth: usize, scope: &Scope) -> bool {
        if depth <= self.options.max_depth {
            return true;
        }
        let location = scope.base(self.cache.root()).to_string();
        tracing::warn!(%location, max_depth = self.options.max_depth, "schema nesting too deep, skipping subtree");
        self.warnings
            .push(ResolveWarning::depth_exceeded(&location, self.options.max_depth));
        false
    }
}

/// Resolve every reference of `document` in place.
///
/// Fails only when `options.base_uri` is not an absolute URL; anything that
/// goes wrong with an individual reference is reported in
/// [`ResolveReport::warnings`] and the reference is left as written.
pub fn resolve_document(
    document: &mut Document,
    fetcher: &dyn Fetch,
    options: &ResolveOptions,
) -> Result<ResolveReport, ResolveError> {
    let root = options.root_uri()?;
    let mut cache = ResolverCache::new(fetcher, root);

    let mut resolver = Resolver::new(
        &mut document.definitions,
        document.layout,
        &mut cache,
        options,
    );
    resolver.resolve_definitions();
    let merged = resolver.merged().to_vec();
    let warnings = resolver.into_warnings();

    tracing::debug!(
        merged = merged.len(),
        warnings = warnings.len(),
        fetches = cache.fetch_count(),
        "resolution pass complete"
    );

    Ok(ResolveReport {
        warnings,
        merged,
        fetches: cache.fetch_count(),
    })
}
