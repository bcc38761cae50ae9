//! relgraph schema catalog
//!
//! Immutable, process-lifetime metadata: entity types, their properties and
//! key shape, navigation properties and entity sets.
//!
//! Responsibilities:
//! - Describe entity types and relationships
//! - Resolve accessor capabilities once, at build time
//! - Resolve member names to scalar / single / collection variants

mod accessor;
mod builder;
mod catalog;
mod types;

pub use accessor::{coerce_value, AccessError, AccessResult, Accessor, TypeAdapter};
pub use builder::{CatalogBuilder, CatalogError, NavigationDef, PropertyDef, TypeBuilder};
pub use catalog::SchemaCatalog;
pub use types::{
    EntitySetDescriptor, EntityTypeDescriptor, KeyShape, Member, Multiplicity,
    NavigationPropertyDescriptor, PropertyDescriptor, RelationMapping,
};
