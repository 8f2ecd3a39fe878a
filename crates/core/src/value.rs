//! Heterogeneous attribute values.
//!
//! Every stored value carries its [`Type`](crate::Type) through the variant
//! it is constructed as — there is no "any"/"unknown" catch-all.

use crate::Type;
use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A single attribute value, tagged with its runtime kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Value {
    /// `int` value.
    Int(i64),
    /// `decimal` value.
    Decimal(f64),
    /// `bool` value.
    Bool(bool),
    /// `string` value.
    String(String),
    /// `rune` value (a single character).
    Rune(char),
    /// `datetime` value.
    Datetime(Timestamp),
}

impl Value {
    /// The [`Type`] this value's variant corresponds to.
    pub fn data_type(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Decimal(_) => Type::Decimal,
            Value::Bool(_) => Type::Bool,
            Value::String(_) => Type::String,
            Value::Rune(_) => Type::Rune,
            Value::Datetime(_) => Type::Datetime,
        }
    }

    /// Whether this value satisfies a schema's declared type for the
    /// attribute it is stored under.
    pub fn matches_type(&self, declared: Type) -> bool {
        self.data_type() == declared
    }

    /// Render the value for attribute selectors that compare/contain on
    /// strings (`Contains`), or for stringifying a `GroupBy` key.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Rune(v) => v.to_string(),
            Value::Datetime(v) => v.to_rfc3339(),
        }
    }
}
