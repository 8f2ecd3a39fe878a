//! The closed enumeration of attribute types (spec §3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared attribute type. Schemas map attribute names to one of these;
/// every stored [`crate::Value`] must satisfy its schema's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Type {
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Decimal,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
    /// A single character.
    Rune,
    /// RFC-3339 timestamp.
    Datetime,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int => "int",
            Type::Decimal => "decimal",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Rune => "rune",
            Type::Datetime => "datetime",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Type::Decimal.to_string(), "decimal");
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&Type::Datetime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Type::Datetime);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = serde_json::from_str::<Type>("\"unknown\"");
        assert!(err.is_err());
    }
}
