//! NavigationResolver: walks `/`-separated navigation paths from a root record.
//!
//! Each segment names a member of the current entity type and may carry a
//! parenthesized key literal selecting one member of a collection, as in
//! `Lines(OrderId=10,LineNo=2)/Product`.

use crate::relations::{load_related, RelatedRecords};
use crate::{KeyCodec, ProducerError, ProducerResult};
use regex_lite::Regex;
use relgraph_catalog::{EntityTypeDescriptor, Member, PropertyDescriptor, SchemaCatalog};
use relgraph_core::{EntityKey, Record, Value};
use relgraph_store::StoreSession;
use std::sync::LazyLock;

static SEGMENT_PATTERN: LazyLock<Result<Regex, regex_lite::Error>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\((.*)\))?$"));

/// Where a navigation path ends.
#[derive(Debug)]
pub enum Resolved<'c> {
    Single {
        entity_type: &'c EntityTypeDescriptor,
        record: Record,
    },
    Collection {
        entity_type: &'c EntityTypeDescriptor,
        records: Vec<Record>,
    },
    /// A plain property of the last entity on the path.
    Property {
        owner: &'c EntityTypeDescriptor,
        property: &'c PropertyDescriptor,
        value: Value,
    },
}

/// One parsed path segment.
#[derive(Debug, PartialEq)]
struct Segment<'p> {
    name: &'p str,
    key: Option<&'p str>,
}

pub struct NavigationResolver<'c> {
    catalog: &'c SchemaCatalog,
}

impl<'c> NavigationResolver<'c> {
    pub fn new(catalog: &'c SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Walk `path` starting at `root`.
    pub fn resolve(
        &self,
        session: &mut dyn StoreSession,
        root_type: &'c EntityTypeDescriptor,
        root: Record,
        path: &str,
    ) -> ProducerResult<Resolved<'c>> {
        let mut current = Resolved::Single {
            entity_type: root_type,
            record: root,
        };
        for raw in path.trim_matches('/').split('/').filter(|s| !s.is_empty()) {
            let segment = parse_segment(raw)?;
            current = self.step(session, current, raw, &segment)?;
            if let Some(key) = segment.key {
                current = select_member(current, raw, key)?;
            }
        }
        Ok(current)
    }

    fn step(
        &self,
        session: &mut dyn StoreSession,
        current: Resolved<'c>,
        raw: &str,
        segment: &Segment<'_>,
    ) -> ProducerResult<Resolved<'c>> {
        let (entity_type, record) = match current {
            Resolved::Single {
                entity_type,
                record,
            } => (entity_type, record),
            Resolved::Collection { .. } => {
                return Err(ProducerError::invalid_path_segment(
                    raw,
                    "collection must be the final segment",
                ))
            }
            Resolved::Property { .. } => {
                return Err(ProducerError::invalid_path_segment(
                    raw,
                    "a property must be the final segment",
                ))
            }
        };

        let member = entity_type.member(segment.name).ok_or_else(|| {
            ProducerError::invalid_path_segment(
                raw,
                format!("{} has no member {}", entity_type.name, segment.name),
            )
        })?;
        log::debug!("navigating {}.{}", entity_type.name, segment.name);

        match member {
            Member::Scalar(property) => {
                let value = property
                    .read(&record)
                    .map_err(|e| ProducerError::materialization(&entity_type.name, e))?;
                if value.is_null() {
                    return Err(not_found(raw));
                }
                Ok(Resolved::Property {
                    owner: entity_type,
                    property,
                    value,
                })
            }
            Member::SingleRelation(navigation) | Member::CollectionRelation(navigation) => {
                let target = self.catalog.entity_type(&navigation.target_type).ok_or_else(|| {
                    ProducerError::materialization(
                        &entity_type.name,
                        format!("unknown target type {}", navigation.target_type),
                    )
                })?;
                match load_related(session, entity_type, navigation, &record)? {
                    RelatedRecords::One(Some(record)) => Ok(Resolved::Single {
                        entity_type: target,
                        record,
                    }),
                    RelatedRecords::One(None) => Err(not_found(raw)),
                    RelatedRecords::Many(records) => Ok(Resolved::Collection {
                        entity_type: target,
                        records,
                    }),
                }
            }
        }
    }
}

/// Pick the collection member whose key equals `key_text`, scanning in order.
fn select_member<'c>(current: Resolved<'c>, raw: &str, key_text: &str) -> ProducerResult<Resolved<'c>> {
    let Resolved::Collection {
        entity_type,
        records,
    } = current
    else {
        return Err(ProducerError::invalid_path_segment(
            raw,
            "a key can only select from a collection",
        ));
    };

    let key = EntityKey::parse(key_text)
        .map_err(|e| ProducerError::key_conversion(&entity_type.name, e.to_string()))?;
    let wanted = KeyCodec::new(entity_type).to_record_key(&key)?;

    for record in records {
        let key = entity_type
            .record_key(&record)
            .map_err(|e| ProducerError::materialization(&entity_type.name, e))?;
        if key == wanted {
            return Ok(Resolved::Single {
                entity_type,
                record,
            });
        }
    }
    Err(not_found(raw))
}

fn parse_segment(raw: &str) -> ProducerResult<Segment<'_>> {
    let pattern = SEGMENT_PATTERN
        .as_ref()
        .map_err(|e| ProducerError::invalid_path_segment(raw, e.to_string()))?;
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| ProducerError::invalid_path_segment(raw, "malformed segment"))?;
    let name = captures
        .get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| ProducerError::invalid_path_segment(raw, "missing member name"))?;
    Ok(Segment {
        name,
        key: captures.get(2).map(|m| m.as_str()),
    })
}

fn not_found(segment: &str) -> ProducerError {
    ProducerError::entity_not_found(format!("Resource not found for the segment '{}'", segment))
}
