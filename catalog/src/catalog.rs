//! The SchemaCatalog - immutable schema lookup.

use crate::{EntitySetDescriptor, EntityTypeDescriptor, Member};
use std::collections::HashMap;

/// The SchemaCatalog provides runtime lookup of entity types and entity sets.
/// It is immutable after construction and shared read-only by every operation.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    /// Namespace types are published under.
    namespace: String,
    /// Entity types in declaration order.
    types: Vec<EntityTypeDescriptor>,
    /// Entity type index by name.
    type_names: HashMap<String, usize>,
    /// Entity sets in declaration order.
    entity_sets: Vec<EntitySetDescriptor>,
    /// Entity set index by name.
    set_names: HashMap<String, usize>,
    /// Entity set index by entity type name.
    set_by_type: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// Create a catalog (use CatalogBuilder for construction).
    pub(crate) fn new(
        namespace: String,
        types: Vec<EntityTypeDescriptor>,
        entity_sets: Vec<EntitySetDescriptor>,
    ) -> Self {
        let type_names = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        let set_names = entity_sets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        let mut set_by_type = HashMap::new();
        for (i, set) in entity_sets.iter().enumerate() {
            set_by_type.entry(set.entity_type.clone()).or_insert(i);
        }

        Self {
            namespace,
            types,
            type_names,
            entity_sets,
            set_names,
            set_by_type,
        }
    }

    /// Namespace of the published schema.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ==================== Type Lookups ====================

    /// Get an entity type by name.
    pub fn entity_type(&self, name: &str) -> Option<&EntityTypeDescriptor> {
        self.type_names.get(name).map(|&i| &self.types[i])
    }

    /// Get an entity type by namespace-qualified name (`Namespace.Type`).
    pub fn entity_type_by_full_name(&self, full_name: &str) -> Option<&EntityTypeDescriptor> {
        let (namespace, name) = full_name.rsplit_once('.')?;
        self.entity_type(name).filter(|t| t.namespace == namespace)
    }

    /// Get all entity types.
    pub fn all_types(&self) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.types.iter()
    }

    /// Resolve a member of an entity type.
    pub fn member(&self, type_name: &str, member: &str) -> Option<Member<'_>> {
        self.entity_type(type_name)?.member(member)
    }

    /// Find a member by name across all types, in declaration order.
    pub fn navigation_property(&self, name: &str) -> Option<Member<'_>> {
        self.types.iter().find_map(|t| t.member(name))
    }

    // ==================== Entity Set Lookups ====================

    /// Get an entity set by name.
    pub fn entity_set(&self, name: &str) -> Option<&EntitySetDescriptor> {
        self.set_names.get(name).map(|&i| &self.entity_sets[i])
    }

    /// Get the (first) entity set exposing the given entity type.
    pub fn entity_set_for(&self, type_name: &str) -> Option<&EntitySetDescriptor> {
        self.set_by_type.get(type_name).map(|&i| &self.entity_sets[i])
    }

    /// Get all entity sets.
    pub fn all_entity_sets(&self) -> impl Iterator<Item = &EntitySetDescriptor> {
        self.entity_sets.iter()
    }
}
