//! Entity: an instance of a schema.

use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An instance of a schema. `id` is globally unique within a database and
/// is the entity's key in the entity key-value history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Entity {
    /// Globally unique entity identifier.
    pub id: u64,
    /// The schema this entity is an instance of.
    pub schema_name: String,
    /// Attribute name -> value.
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    /// Build a new entity with no attributes.
    pub fn new(id: u64, schema_name: impl Into<String>) -> Self {
        Entity {
            id,
            schema_name: schema_name.into(),
            attributes: BTreeMap::new(),
        }
    }
}
