//! The language-neutral expression tree (spec §4.9): every node is either
//! a literal or an operator application.

use serde::{Deserialize, Serialize};

/// The type a node's evaluated result carries. The first six are ordinary
/// attribute value types; the last three mark a node as producing a
/// `Filter`, `Collector`, or `GroupCollector` rather than a [`Value`](tstore_core::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// `int` literal or attribute.
    Int,
    /// `decimal` literal or attribute.
    Decimal,
    /// `bool` literal or attribute.
    Bool,
    /// `string` literal or attribute.
    String,
    /// `rune` literal or attribute.
    Rune,
    /// `datetime` literal or attribute.
    Datetime,
    /// A node that evaluates to a `Filter`.
    FilterExpression,
    /// A node that evaluates to a `Collector`.
    CollectorExpression,
    /// A node that evaluates to a `GroupCollector`.
    GroupCollectorExpression,
}

/// The operator an operator-application node applies to its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// `And(filter, filter) -> filter`.
    And,
    /// `Or(filter, filter) -> filter`.
    Or,
    /// `Not(filter) -> filter`.
    Not,
    /// `All() -> filter`, matches every item.
    All,
    /// `EqualTo(attribute, value) -> filter`.
    EqualTo,
    /// `Contains(attribute, substring) -> filter`.
    Contains,
    /// `LessThan(attribute, value) -> filter`.
    LessThan,
    /// `LessThanOrEqualTo(attribute, value) -> filter`.
    LessThanOrEqualTo,
    /// `GreaterThan(attribute, value) -> filter`.
    GreaterThan,
    /// `GreaterThanOrEqualTo(attribute, value) -> filter`.
    GreaterThanOrEqualTo,
    /// `Find(filter) -> collector`.
    Find,
    /// `Take(collector, count) -> collector`.
    Take,
    /// `Asc(collector, attribute) -> collector`.
    Asc,
    /// `Desc(collector, attribute) -> collector`.
    Desc,
    /// `GroupBy(collector, attribute) -> groupCollector`.
    GroupBy,
    /// `EachGroup(groupCollector, collector) -> groupCollector`.
    EachGroup,
}

/// One node of the expression tree. A literal node (`is_value: true`)
/// carries its parsed-at-evaluation-time `value` string; an operator node
/// carries `operator` and its `inputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    /// Whether this node is a literal (`true`) or an operator application
    /// (`false`).
    pub is_value: bool,
    /// The type this node evaluates to.
    pub output_type: DataType,
    /// The literal's unparsed string form. `None` for operator nodes.
    pub value: Option<String>,
    /// The operator to apply. `None` for literal nodes.
    pub operator: Option<Operator>,
    /// The operator's arguments, in order. Empty for literal nodes.
    pub inputs: Vec<Expression>,
}

impl Expression {
    /// Build a literal node.
    pub fn literal(output_type: DataType, value: impl Into<String>) -> Self {
        Expression {
            is_value: true,
            output_type,
            value: Some(value.into()),
            operator: None,
            inputs: Vec::new(),
        }
    }

    /// Build an operator-application node.
    pub fn operation(operator: Operator, output_type: DataType, inputs: Vec<Expression>) -> Self {
        Expression {
            is_value: false,
            output_type,
            value: None,
            operator: Some(operator),
            inputs,
        }
    }
}
