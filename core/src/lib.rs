//! relgraph core types
//!
//! This crate provides the foundational types used throughout relgraph:
//! - Values and declared value types
//! - Entity keys and key literal parsing
//! - The protocol-neutral entity representation (properties and links)
//! - Store-native records and record keys
//! - Common error types

mod entity;
mod error;
mod key;
mod record;
mod value;

pub use entity::*;
pub use error::*;
pub use key::*;
pub use record::*;
pub use value::*;
