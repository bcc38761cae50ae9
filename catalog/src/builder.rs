//! CatalogBuilder for constructing an immutable SchemaCatalog.

use crate::{
    Accessor, EntitySetDescriptor, EntityTypeDescriptor, KeyShape, Multiplicity,
    NavigationPropertyDescriptor, PropertyDescriptor, RelationMapping, SchemaCatalog, TypeAdapter,
};
use relgraph_core::ValueType;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate entity type name: {0}")]
    DuplicateTypeName(String),

    #[error("Duplicate member {member} on type {type_name}")]
    DuplicateMember { type_name: String, member: String },

    #[error("Entity type {0} declares no key")]
    MissingKey(String),

    #[error("Key property {property} is not declared on type {type_name}")]
    UnknownKeyProperty { type_name: String, property: String },

    #[error("Duplicate entity set name: {0}")]
    DuplicateEntitySet(String),

    #[error("Unknown entity type in entity set {set}: {type_name}")]
    UnknownTypeInEntitySet { set: String, type_name: String },

    #[error("Unknown target type {target} for navigation {type_name}.{navigation}")]
    UnknownNavigationTarget {
        type_name: String,
        navigation: String,
        target: String,
    },

    #[error("Navigation {type_name}.{navigation} is mapped by {field}, which {target} does not own")]
    InvalidMappedBy {
        type_name: String,
        navigation: String,
        target: String,
        field: String,
    },
}

/// Property definition used while building a type.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the property accepts null.
    pub nullable: bool,
    /// Store field name when it differs from the property name.
    pub column: Option<String>,
    /// Store representation adapter.
    pub adapter: TypeAdapter,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            nullable: false,
            column: None,
            adapter: TypeAdapter::Identity,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Store a date/time property as epoch milliseconds.
    pub fn epoch_millis(mut self) -> Self {
        self.adapter = TypeAdapter::EpochMillis;
        self
    }

    fn field_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// Navigation property definition used while building a type.
#[derive(Debug, Clone)]
pub struct NavigationDef {
    pub name: String,
    pub target_type: String,
    pub multiplicity: Multiplicity,
    pub mapping: RelationMapping,
    pub from_role: Option<String>,
    pub to_role: Option<String>,
}

impl NavigationDef {
    /// Single-valued relationship owned by a reference field of the same name.
    pub fn one(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::with_multiplicity(name, target_type, Multiplicity::One)
    }

    /// Optional single-valued relationship.
    pub fn optional(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::with_multiplicity(name, target_type, Multiplicity::ZeroOrOne)
    }

    /// Collection-valued relationship.
    pub fn many(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::with_multiplicity(name, target_type, Multiplicity::Many)
    }

    fn with_multiplicity(
        name: impl Into<String>,
        target_type: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        let name = name.into();
        Self {
            mapping: RelationMapping::Owned {
                field: name.clone(),
            },
            name,
            target_type: target_type.into(),
            multiplicity,
            from_role: None,
            to_role: None,
        }
    }

    /// Store the reference(s) in `field` on this record.
    pub fn owned(mut self, field: impl Into<String>) -> Self {
        self.mapping = RelationMapping::Owned {
            field: field.into(),
        };
        self
    }

    /// Inverse side of a relationship owned by `field` on the target type.
    pub fn mapped_by(mut self, field: impl Into<String>) -> Self {
        self.mapping = RelationMapping::MappedBy {
            field: field.into(),
        };
        self
    }

    /// Association role names.
    pub fn roles(mut self, from_role: impl Into<String>, to_role: impl Into<String>) -> Self {
        self.from_role = Some(from_role.into());
        self.to_role = Some(to_role.into());
        self
    }
}

/// Builder for constructing an immutable SchemaCatalog.
#[derive(Debug)]
pub struct CatalogBuilder {
    /// Namespace types are published under.
    namespace: String,
    /// Types being built.
    types: Vec<EntityTypeDescriptor>,
    /// Entity sets being built.
    entity_sets: Vec<EntitySetDescriptor>,
}

impl CatalogBuilder {
    /// Create a new builder.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            types: Vec::new(),
            entity_sets: Vec::new(),
        }
    }

    /// Add an entity type definition.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        TypeBuilder {
            builder: self,
            name: name.into(),
            properties: Vec::new(),
            key: None,
            navigations: Vec::new(),
        }
    }

    /// Expose an entity type through a named entity set.
    pub fn add_entity_set(
        &mut self,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        if self.entity_sets.iter().any(|s| s.name == name) {
            return Err(CatalogError::DuplicateEntitySet(name));
        }
        self.entity_sets.push(EntitySetDescriptor {
            name,
            entity_type: entity_type.into(),
        });
        Ok(())
    }

    /// Build the immutable SchemaCatalog.
    pub fn build(self) -> Result<SchemaCatalog, CatalogError> {
        for set in &self.entity_sets {
            if !self.types.iter().any(|t| t.name == set.entity_type) {
                return Err(CatalogError::UnknownTypeInEntitySet {
                    set: set.name.clone(),
                    type_name: set.entity_type.clone(),
                });
            }
        }

        for ty in &self.types {
            for nav in &ty.navigations {
                let target = self
                    .types
                    .iter()
                    .find(|t| t.name == nav.target_type)
                    .ok_or_else(|| CatalogError::UnknownNavigationTarget {
                        type_name: ty.name.clone(),
                        navigation: nav.name.clone(),
                        target: nav.target_type.clone(),
                    })?;

                // The inverse side must point at a reference the target owns.
                if let RelationMapping::MappedBy { field } = &nav.mapping {
                    let owned = target.navigations.iter().any(|n| {
                        n.target_type == ty.name
                            && n.mapping == RelationMapping::Owned {
                                field: field.clone(),
                            }
                    });
                    if !owned {
                        return Err(CatalogError::InvalidMappedBy {
                            type_name: ty.name.clone(),
                            navigation: nav.name.clone(),
                            target: target.name.clone(),
                            field: field.clone(),
                        });
                    }
                }
            }
        }

        Ok(SchemaCatalog::new(
            self.namespace,
            self.types,
            self.entity_sets,
        ))
    }
}

/// Builder for an entity type definition.
pub struct TypeBuilder<'a> {
    builder: &'a mut CatalogBuilder,
    name: String,
    properties: Vec<PropertyDef>,
    key: Option<KeySpec>,
    navigations: Vec<NavigationDef>,
}

enum KeySpec {
    Simple(String),
    Embedded {
        field: String,
        components: Vec<String>,
    },
}

impl<'a> TypeBuilder<'a> {
    /// Add a property.
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare a single-property key.
    pub fn key(mut self, property: impl Into<String>) -> Self {
        self.key = Some(KeySpec::Simple(property.into()));
        self
    }

    /// Declare a composite key stored as an embedded sub-record in `field`.
    pub fn embedded_key<I, S>(mut self, field: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = Some(KeySpec::Embedded {
            field: field.into(),
            components: components.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a navigation property.
    pub fn navigation(mut self, navigation: NavigationDef) -> Self {
        self.navigations.push(navigation);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> Result<(), CatalogError> {
        if self.builder.types.iter().any(|t| t.name == self.name) {
            return Err(CatalogError::DuplicateTypeName(self.name));
        }

        let mut seen = HashSet::new();
        let member_names = self
            .properties
            .iter()
            .map(|p| &p.name)
            .chain(self.navigations.iter().map(|n| &n.name));
        for name in member_names {
            if !seen.insert(name.clone()) {
                return Err(CatalogError::DuplicateMember {
                    type_name: self.name.clone(),
                    member: name.clone(),
                });
            }
        }

        let key = match self.key {
            None => return Err(CatalogError::MissingKey(self.name)),
            Some(KeySpec::Simple(property)) => KeyShape::Simple { property },
            Some(KeySpec::Embedded { field, components }) => {
                KeyShape::Embedded { field, components }
            }
        };

        let key_names: Vec<String> = match &key {
            KeyShape::Simple { property } => vec![property.clone()],
            KeyShape::Embedded { components, .. } => components.clone(),
        };
        for key_name in &key_names {
            if !self.properties.iter().any(|p| &p.name == key_name) {
                return Err(CatalogError::UnknownKeyProperty {
                    type_name: self.name.clone(),
                    property: key_name.clone(),
                });
            }
        }

        // Resolve accessors once, here.
        let properties = self
            .properties
            .into_iter()
            .map(|def| {
                let is_key = key_names.contains(&def.name);
                let accessor = match (&key, is_key) {
                    (KeyShape::Embedded { field, .. }, true) => Accessor::KeyComponent {
                        key_field: field.clone(),
                        component: def.field_name().to_string(),
                        adapter: def.adapter,
                    },
                    _ => Accessor::Field {
                        field: def.field_name().to_string(),
                        adapter: def.adapter,
                    },
                };
                PropertyDescriptor {
                    name: def.name,
                    value_type: def.value_type,
                    nullable: def.nullable && !is_key,
                    accessor,
                }
            })
            .collect();

        let type_name = self.name.clone();
        let navigations = self
            .navigations
            .into_iter()
            .map(|def| NavigationPropertyDescriptor {
                from_role: def.from_role.unwrap_or_else(|| type_name.clone()),
                to_role: def.to_role.unwrap_or_else(|| def.target_type.clone()),
                name: def.name,
                target_type: def.target_type,
                multiplicity: def.multiplicity,
                mapping: def.mapping,
            })
            .collect();

        self.builder.types.push(EntityTypeDescriptor {
            name: self.name,
            namespace: self.builder.namespace.clone(),
            properties,
            key,
            navigations,
        });

        Ok(())
    }
}
