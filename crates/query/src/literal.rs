//! Literal parsing: turning an [`Expression`](crate::Expression) literal's
//! string payload into a typed [`Value`], per the rules in
//! `original_source/query/lang/data_type.go`'s `ParseValue`.

use tstore_core::{Result, TStoreError, Timestamp, Value};

use crate::expression::DataType;

/// Parse `raw` as the given `output_type`. Integers are base-10, floats
/// are decimal, bools are exactly `true`/`false`, runes are a single
/// character, and datetimes are RFC-3339.
pub fn parse_literal(output_type: DataType, raw: &str) -> Result<Value> {
    match output_type {
        DataType::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| TStoreError::InvalidQuery(format!("not a base-10 integer: {raw}"))),
        DataType::Decimal => raw
            .parse::<f64>()
            .map(Value::Decimal)
            .map_err(|_| TStoreError::InvalidQuery(format!("not a decimal: {raw}"))),
        DataType::Bool => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(TStoreError::InvalidQuery(format!("not a bool literal: {raw}"))),
        },
        DataType::String => Ok(Value::String(raw.to_string())),
        DataType::Rune => {
            let mut chars = raw.chars();
            let first = chars.next().ok_or_else(|| TStoreError::InvalidQuery("empty rune literal".to_string()))?;
            if chars.next().is_some() {
                return Err(TStoreError::InvalidQuery(format!("not a single character: {raw}")));
            }
            Ok(Value::Rune(first))
        }
        DataType::Datetime => Timestamp::parse_rfc3339(raw)
            .map(Value::Datetime)
            .map_err(|error| TStoreError::InvalidQuery(format!("not an RFC-3339 datetime: {raw} ({error})"))),
        other => Err(TStoreError::InvalidQuery(format!("{other:?} has no literal form"))),
    }
}

/// A total ordering over values of the *same* variant, used by
/// `LessThan`/`GreaterThan`/`Asc`/`Desc`. `None` if the two values are
/// different variants (a type mismatch the evaluator should have already
/// rejected) or the variant has no natural order (`Bool`).
pub fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        (Value::Rune(x), Value::Rune(y)) => x.partial_cmp(y),
        (Value::Datetime(x), Value::Datetime(y)) => x.partial_cmp(y),
        _ => None,
    }
}
