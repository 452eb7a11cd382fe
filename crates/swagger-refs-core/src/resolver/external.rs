//! Merging external fragments into the local registry.
//!
//! For a reference `other.yaml#/definitions/Base`:
//!
//! 1. split it into location + fragment, relative to the document it was
//!    written in;
//! 2. load `other.yaml` through the cache (at most once per pass);
//! 3. pick a free local name (`Base`, else `Base_1`, `Base_2`, ...) and
//!    reserve it, so references that cycle back here see the same name;
//! 4. resolve the fragment itself, in the scope of `other.yaml`;
//! 5. insert it and return `#/definitions/<local name>`.
//!
//! References of the fragment that stay unresolved are made absolute, and
//! the ones under keywords the model does not walk are reported.

use super::{MergedDefinition, Resolver, Scope};
use crate::error::ResolveError;
use crate::ref_utils::{ExternalTarget, RefFormat, TargetKey};
use crate::schema::SchemaNode;
use crate::warning::ResolveWarning;

enum Placement {
    /// A structurally identical definition already has this name.
    Existing(String),
    New(String),
}

impl Resolver<'_, '_> {
    /// Merge the target of `reference` and return the local reference to
    /// it, or `None` (reported as a warning) if it cannot be merged.
    pub(crate) fn resolve_external(
        &mut self,
        reference: &str,
        format: RefFormat,
        scope: &Scope,
        depth: usize,
    ) -> Option<String> {
        match self.merge_external(reference, scope, depth) {
            Ok(local) => Some(local),
            Err(error) => {
                tracing::warn!(reference, ?format, %error, "leaving reference unresolved");
                self.warnings
                    .push(ResolveWarning::unresolved(reference, &error));
                None
            }
        }
    }

    fn merge_external(
        &mut self,
        reference: &str,
        scope: &Scope,
        depth: usize,
    ) -> Result<String, ResolveError> {
        let target = ExternalTarget::locate(reference, scope.base(self.cache.root()))?;

        // Pointing back into the root document: already local.
        if target.location == *self.cache.root() {
            return match target.fragment {
                Some(fragment) => Ok(format!("#{fragment}")),
                None => Err(ResolveError::malformed(
                    reference,
                    "reference to the root document needs a fragment",
                )),
            };
        }

        // A re-entrant key already has its local name recorded, which
        // `merge_target` hands back without recursing.
        let key = target.key();
        let reentrant = !self.cache.mark_in_progress(&key);
        if reentrant {
            tracing::trace!(%key, "re-entrant reference");
        }

        let result = self.merge_target(&target, &key, depth);
        if !reentrant {
            self.cache.finish(&key);
        }
        result
    }

    fn merge_target(
        &mut self,
        target: &ExternalTarget,
        key: &TargetKey,
        depth: usize,
    ) -> Result<String, ResolveError> {
        if let Some(name) = self.cache.local_name(key) {
            tracing::trace!(%key, local = name, "fragment already merged");
            return Ok(self.layout.local_ref(name));
        }

        let document = self.cache.get_or_load(&target.location)?;
        let fragment = target.select(document)?.clone();
        let mut node = SchemaNode::from_value(fragment, self.layout);

        let name = target
            .definition_name()
            .ok_or_else(|| ResolveError::malformed(&key.to_string(), "no definition name"))?;

        let local = match self.place(&name, &node) {
            Placement::Existing(local) => {
                tracing::debug!(%key, local = %local, "reusing identical definition");
                self.cache.record_local_name(key.clone(), local.clone());
                return Ok(self.layout.local_ref(&local));
            }
            Placement::New(local) => local,
        };
        if local != name {
            tracing::debug!(%key, from = %name, to = %local, "renaming colliding definition");
        }

        self.cache.record_local_name(key.clone(), local.clone());
        self.resolve_model(
            Some(&mut node),
            &Scope::External(target.location.clone()),
            depth + 1,
        );
        for reference in node.verbatim_refs() {
            tracing::warn!(%key, %reference, "reference under a keyword that is not resolved");
            self.warnings
                .push(ResolveWarning::unmodeled(&reference, target.location.as_str()));
        }

        tracing::debug!(%key, local = %local, "merged external definition");
        self.definitions.insert(local.clone(), node);
        self.merged.push(MergedDefinition {
            source: key.to_string(),
            local_name: local.clone(),
        });
        Ok(self.layout.local_ref(&local))
    }

    /// First of `name`, `name_1`, `name_2`, ... that is free, unless an
    /// identical reference-free definition is met on the way.
    fn place(&self, name: &str, node: &SchemaNode) -> Placement {
        let reuse = self.options.reuse_identical && node.is_self_contained();
        let mut candidate = name.to_string();
        let mut suffix = 0;
        loop {
            match self.definitions.get(&candidate) {
                Some(existing) if reuse && existing == node => {
                    return Placement::Existing(candidate)
                }
                None if !self.cache.is_reserved(&candidate) => return Placement::New(candidate),
                _ => {
                    suffix += 1;
                    candidate = format!("{name}_{suffix}");
                }
            }
        }
    }
}
