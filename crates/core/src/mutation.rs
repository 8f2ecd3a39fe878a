//! Mutations: the nine kinds of schema/entity change a transaction may
//! request (spec §3).

use crate::{Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kind of a [`Mutation`], used as the wire tag and by callers that
/// want to branch on mutation shape without matching the full payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationType {
    /// See [`Mutation::CreateSchema`].
    CreateSchema,
    /// See [`Mutation::DeleteSchema`].
    DeleteSchema,
    /// See [`Mutation::CreateSchemaAttributes`].
    CreateSchemaAttributes,
    /// See [`Mutation::DeleteSchemaAttributes`].
    DeleteSchemaAttributes,
    /// See [`Mutation::CreateEntity`].
    CreateEntity,
    /// See [`Mutation::DeleteEntity`].
    DeleteEntity,
    /// See [`Mutation::CreateEntityAttributes`].
    CreateEntityAttributes,
    /// See [`Mutation::DeleteEntityAttributes`].
    DeleteEntityAttributes,
    /// See [`Mutation::UpdateEntityAttributes`].
    UpdateEntityAttributes,
}

/// A single schema- or entity-level change request.
///
/// Each variant carries exactly the fields it needs, rather than the
/// original's flat struct with unused `SchemaInput`/`EntityInput` fields
/// left at their zero value — an entity mutation simply has no schema
/// payload slot to leave empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Create a new, empty-or-seeded schema. Fails if the name is already
    /// registered at the committing transaction.
    CreateSchema {
        /// Schema name.
        schema_name: String,
        /// Initial attributes.
        attributes: BTreeMap<String, Type>,
    },
    /// Mark a schema as deleted at this commit.
    DeleteSchema {
        /// Schema name.
        schema_name: String,
    },
    /// Add attributes to an existing (or about-to-exist) schema. Fails if
    /// any named attribute already exists on the schema.
    CreateSchemaAttributes {
        /// Schema name.
        schema_name: String,
        /// Attributes to add.
        attributes: BTreeMap<String, Type>,
    },
    /// Remove attributes from a schema, cascading a
    /// `DeleteEntityAttributes` to every entity of that schema.
    DeleteSchemaAttributes {
        /// Schema name.
        schema_name: String,
        /// Attribute names to remove.
        attributes: Vec<String>,
    },
    /// Create a new entity of the given schema. The entity ID is assigned
    /// by the mutator, not supplied by the caller.
    CreateEntity {
        /// Schema the new entity instantiates.
        schema_name: String,
        /// Initial attribute values.
        attributes: BTreeMap<String, Value>,
    },
    /// Mark an entity as deleted at this commit.
    DeleteEntity {
        /// Entity to delete.
        entity_id: u64,
    },
    /// Add attributes to an existing entity. Fails if any named attribute
    /// already exists on the entity.
    CreateEntityAttributes {
        /// Entity to modify.
        entity_id: u64,
        /// Attributes to add.
        attributes: BTreeMap<String, Value>,
    },
    /// Remove attributes from an entity. Fails if any named attribute is
    /// absent.
    DeleteEntityAttributes {
        /// Entity to modify.
        entity_id: u64,
        /// Attribute names to remove.
        attributes: Vec<String>,
    },
    /// Overwrite the value of existing attributes on an entity. Fails if
    /// any named attribute is absent.
    UpdateEntityAttributes {
        /// Entity to modify.
        entity_id: u64,
        /// New attribute values.
        attributes: BTreeMap<String, Value>,
    },
}

impl Mutation {
    /// The [`MutationType`] tag for this mutation.
    pub fn kind(&self) -> MutationType {
        match self {
            Mutation::CreateSchema { .. } => MutationType::CreateSchema,
            Mutation::DeleteSchema { .. } => MutationType::DeleteSchema,
            Mutation::CreateSchemaAttributes { .. } => MutationType::CreateSchemaAttributes,
            Mutation::DeleteSchemaAttributes { .. } => MutationType::DeleteSchemaAttributes,
            Mutation::CreateEntity { .. } => MutationType::CreateEntity,
            Mutation::DeleteEntity { .. } => MutationType::DeleteEntity,
            Mutation::CreateEntityAttributes { .. } => MutationType::CreateEntityAttributes,
            Mutation::DeleteEntityAttributes { .. } => MutationType::DeleteEntityAttributes,
            Mutation::UpdateEntityAttributes { .. } => MutationType::UpdateEntityAttributes,
        }
    }

    /// The schema name this mutation groups under, for transactions that
    /// key mutations by schema name (spec §3's `Transaction.mutations`).
    /// Entity mutations group under the entity's schema when known;
    /// callers group entity mutations under the schema name they already
    /// track client-side (the entity itself does not carry it before
    /// creation).
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Mutation::CreateSchema { schema_name, .. }
            | Mutation::DeleteSchema { schema_name }
            | Mutation::CreateSchemaAttributes { schema_name, .. }
            | Mutation::DeleteSchemaAttributes { schema_name, .. }
            | Mutation::CreateEntity { schema_name, .. } => Some(schema_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let m = Mutation::DeleteEntity { entity_id: 1 };
        assert_eq!(m.kind(), MutationType::DeleteEntity);
    }

    #[test]
    fn serde_tags_by_type() {
        let m = Mutation::CreateSchema {
            schema_name: "user".into(),
            attributes: BTreeMap::new(),
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"type\":\"createSchema\""));
    }
}
