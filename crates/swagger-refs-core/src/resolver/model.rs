//! Variant dispatch over schema nodes.

use super::{Resolver, Scope};
use crate::ref_utils::{ExternalTarget, RefFormat};
use crate::schema::{ArrayNode, ComposedNode, ObjectNode, RefNode, SchemaNode};
use crate::warning::ResolveWarning;

impl Resolver<'_, '_> {
    /// Resolve every reference reachable from a root-document node.
    /// `None` is a no-op.
    pub fn resolve(&mut self, node: Option<&mut SchemaNode>) {
        self.resolve_model(node, &Scope::Root, 0);
    }

    pub(crate) fn resolve_model(
        &mut self,
        node: Option<&mut SchemaNode>,
        scope: &Scope,
        depth: usize,
    ) {
        let Some(node) = node else {
            return;
        };
        if !self.enter(depth, scope) {
            return;
        }

        match node {
            SchemaNode::Ref(reference) => self.resolve_ref_node(reference, scope, depth),
            SchemaNode::Array(array) => self.resolve_array(array, scope, depth),
            SchemaNode::Composed(composed) => self.resolve_composed(composed, scope, depth),
            SchemaNode::Object(object) => self.resolve_object(object, scope, depth),
            SchemaNode::Opaque(_) => {}
        }
    }

    /// Rewrite an external reference to its local copy. A reference that
    /// cannot be merged is left as written in the root document, and made
    /// absolute in an external one so it keeps its target once copied.
    pub(crate) fn resolve_ref_node(&mut self, node: &mut RefNode, scope: &Scope, depth: usize) {
        if !node.format.is_external() && *scope == Scope::Root {
            self.check_local(node);
            return;
        }
        match self.resolve_external(&node.reference, node.format, scope, depth) {
            Some(local) => {
                tracing::trace!(from = %node.reference, to = %local, "rewriting reference");
                node.reference = local;
                node.format = RefFormat::Internal;
            }
            None => {
                if let Scope::External(base) = scope {
                    pin_to_source(node, base);
                }
            }
        }
    }

    // `properties` on an array schema is never looked at.
    fn resolve_array(&mut self, array: &mut ArrayNode, scope: &Scope, depth: usize) {
        self.resolve_property_in(array.items.as_mut(), scope, depth + 1);
    }

    fn resolve_composed(&mut self, composed: &mut ComposedNode, scope: &Scope, depth: usize) {
        self.resolve_model(composed.parent.as_deref_mut(), scope, depth + 1);
        self.resolve_model(composed.child.as_deref_mut(), scope, depth + 1);
        for interface in &mut composed.interfaces {
            self.resolve_ref_node(interface, scope, depth + 1);
        }
        for member in &mut composed.inline {
            self.resolve_model(Some(member), scope, depth + 1);
        }
    }

    fn resolve_object(&mut self, object: &mut ObjectNode, scope: &Scope, depth: usize) {
        if let Some(properties) = object.properties.as_mut() {
            for property in properties.values_mut() {
                self.resolve_property_in(Some(property), scope, depth + 1);
            }
        }
        self.resolve_property_in(object.additional_properties.as_deref_mut(), scope, depth + 1);
        let alternatives = object.one_of.iter_mut().chain(&mut object.any_of).flatten();
        for member in alternatives {
            self.resolve_property_in(Some(member), scope, depth + 1);
        }
        self.resolve_property_in(object.not.as_deref_mut(), scope, depth + 1);
    }

    fn check_local(&mut self, node: &RefNode) {
        let Some(name) = self.layout.local_name(&node.reference) else {
            return;
        };
        if !self.definitions.contains_key(&name) && !self.cache.is_reserved(&name) {
            tracing::warn!(reference = %node.reference, "local reference has no definition");
            self.warnings
                .push(ResolveWarning::dangling(&node.reference, &name));
        }
    }
}

/// Replace an unresolvable reference by its absolute form.
fn pin_to_source(node: &mut RefNode, base: &url::Url) {
    let Ok(target) = ExternalTarget::locate(&node.reference, base) else {
        return;
    };
    let absolute = target.absolute_reference();
    tracing::debug!(from = %node.reference, to = %absolute, "keeping unresolved reference absolute");
    node.reference = absolute;
    node.format = RefFormat::Url;
}
