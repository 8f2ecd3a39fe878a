//! Schema: a named set of typed attributes.

use crate::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named set of typed attributes. Keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// Schema name; also its key in the schema key-value history.
    pub name: String,
    /// Attribute name -> declared type.
    pub attributes: BTreeMap<String, Type>,
}

impl Schema {
    /// Build a new, empty schema with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_schema_has_no_attributes() {
        let schema = Schema::new("user");
        assert_eq!(schema.name, "user");
        assert!(schema.attributes.is_empty());
    }
}
