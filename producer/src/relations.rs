//! Reading relationship fields through the store.

use crate::{ProducerError, ProducerResult};
use relgraph_catalog::{EntityTypeDescriptor, NavigationPropertyDescriptor, RelationMapping};
use relgraph_core::{Field, Record, RecordKey};
use relgraph_store::{Predicate, StoreQuery, StoreSession};

/// Records on the far side of a navigation property.
#[derive(Debug)]
pub(crate) enum RelatedRecords {
    One(Option<Record>),
    Many(Vec<Record>),
}

/// Load what `record`'s navigation property refers to.
///
/// Owned references are looked up by key; dangling references are skipped.
/// Inverse (mapped-by) sides query the target type for records pointing back.
pub(crate) fn load_related(
    session: &mut dyn StoreSession,
    owner: &EntityTypeDescriptor,
    navigation: &NavigationPropertyDescriptor,
    record: &Record,
) -> ProducerResult<RelatedRecords> {
    let many = navigation.multiplicity.is_many();
    match &navigation.mapping {
        RelationMapping::Owned { field } => {
            let keys = referenced_keys(owner, navigation, field, record)?;
            let mut records = Vec::with_capacity(keys.len());
            for key in &keys {
                if let Some(related) = session.find_by_key(&navigation.target_type, key)? {
                    records.push(related);
                }
            }
            Ok(if many {
                RelatedRecords::Many(records)
            } else {
                RelatedRecords::One(records.into_iter().next())
            })
        }
        RelationMapping::MappedBy { field } => {
            let key = owner
                .record_key(record)
                .map_err(|e| ProducerError::materialization(&owner.name, e))?;
            let query = StoreQuery::new(&navigation.target_type).filter(Predicate::RefersTo {
                field: field.clone(),
                key,
            });
            let records = session.execute(&query)?;
            Ok(if many {
                RelatedRecords::Many(records)
            } else {
                RelatedRecords::One(records.into_iter().next())
            })
        }
    }
}

fn referenced_keys(
    owner: &EntityTypeDescriptor,
    navigation: &NavigationPropertyDescriptor,
    field: &str,
    record: &Record,
) -> ProducerResult<Vec<RecordKey>> {
    match (record.field(field), navigation.multiplicity.is_many()) {
        (None, _) | (Some(Field::Reference(None)), false) => Ok(Vec::new()),
        (Some(Field::Reference(Some(key))), false) => Ok(vec![key.clone()]),
        (Some(Field::References(keys)), true) => Ok(keys.clone()),
        (Some(_), _) => Err(ProducerError::materialization(
            &owner.name,
            format!(
                "field {} does not hold the references of navigation {}",
                field, navigation.name
            ),
        )),
    }
}
