//! Attribute selectors: the `item -> value` lookup filters and collectors
//! are compiled against (spec §4.9).

use tstore_core::{Entity, Value, Version, VersionStatus};

/// An item a [`crate::Filter`]/[`crate::Collector`] can be evaluated
/// against: something with named attributes. Implemented for [`Entity`]
/// (point-in-time queries) and for `Version<Entity>` (range queries,
/// spec's "parallel selector").
pub trait Queryable {
    /// Resolve `name` to a value, or `None` if the name has no meaning
    /// for this item (an undeclared attribute, for instance).
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl Queryable for Entity {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id as i64)),
            "schema" => Some(Value::String(self.schema_name.clone())),
            _ => self.attributes.get(name).cloned(),
        }
    }
}

impl Queryable for Version<Entity> {
    fn attribute(&self, name: &str) -> Option<Value> {
        if name == "status" {
            let status = match self.status {
                VersionStatus::Created => "created",
                VersionStatus::Updated => "updated",
                VersionStatus::Deleted => "deleted",
            };
            return Some(Value::String(status.to_string()));
        }
        let entity_attribute = name.strip_prefix("value/")?;
        self.value.attribute(entity_attribute)
    }
}
