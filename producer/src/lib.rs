//! relgraph producer
//!
//! Serves entity sets out of a store session:
//! - key conversion between external entity keys and native record keys
//! - materialization of records into entities, with expansion
//! - navigation path resolution
//! - create, update, merge and delete inside one unit of work each
//!
//! # Example
//!
//! ```ignore
//! let producer = Producer::new(catalog, store, ProducerConfig::default());
//! let page = producer.get_entities("Products", &QueryDescriptor::new().top(10))?;
//! ```

mod config;
mod error;
mod key_codec;
mod materializer;
mod mutation;
mod navigation;
mod producer;
mod relations;
mod result;
mod unit_of_work;

#[cfg(test)]
mod fixture;

pub use config::{ConfigError, ProducerConfig};
pub use error::{Cause, ErrorKind, ProducerError, ProducerResult};
pub use key_codec::KeyCodec;
pub use materializer::EntityMaterializer;
pub use mutation::{EntityRepresentation, LinkFollower, MutationCoordinator, NoLinks};
pub use navigation::{NavigationResolver, Resolved};
pub use producer::Producer;
pub use result::{NavigationResult, Page};
pub use unit_of_work::UnitOfWork;
