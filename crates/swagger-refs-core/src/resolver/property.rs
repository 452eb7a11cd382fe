//! Field descriptors: references, containers and inline schemas.

use super::{Resolver, Scope};
use crate::schema::Property;

impl Resolver<'_, '_> {
    /// Resolve every reference reachable from a root-document property.
    /// `None` is a no-op.
    pub fn resolve_property(&mut self, property: Option<&mut Property>) {
        self.resolve_property_in(property, &Scope::Root, 0);
    }

    pub(crate) fn resolve_property_in(
        &mut self,
        property: Option<&mut Property>,
        scope: &Scope,
        depth: usize,
    ) {
        let Some(property) = property else {
            return;
        };
        if !self.enter(depth, scope) {
            return;
        }

        match property {
            Property::Ref(reference) => self.resolve_ref_node(reference, scope, depth),
            Property::Array(array) => {
                self.resolve_property_in(array.items.as_deref_mut(), scope, depth + 1)
            }
            Property::Map(map) => self.resolve_property_in(
                Some(map.additional_properties.as_mut()),
                scope,
                depth + 1,
            ),
            Property::Schema(node) => self.resolve_model(Some(node.as_mut()), scope, depth + 1),
            Property::Primitive(_) | Property::Opaque(_) => {}
        }
    }
}
