//! `Evaluator<T>`: a recursive, arity- and type-checked walk over an
//! [`Expression`] tree that compiles it to a [`Filter`], [`Collector`], or
//! [`GroupCollector`] over items of type `T` (spec §4.9).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tstore_core::{Result, TStoreError, Value};

use crate::expression::{Expression, Operator};
use crate::literal::{compare_values, parse_literal};
use crate::selector::Queryable;

/// A predicate over a single item.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
/// A sequence-to-sequence transform: filtering, sorting, or truncating.
pub type Collector<T> = Box<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;
/// A sequence-to-groups transform, keyed by the stringified selector
/// value (spec's `GroupBy`/`EachGroup`).
pub type GroupCollector<T> = Box<dyn Fn(Vec<T>) -> BTreeMap<String, Vec<T>> + Send + Sync>;

enum Evaluated<T> {
    Value(Value),
    Filter(Filter<T>),
    Collector(Collector<T>),
    GroupCollector(GroupCollector<T>),
}

/// Compiles expression trees against items of type `T` (`Entity` for
/// point-in-time queries, `Version<Entity>` for range queries via the
/// parallel selector).
pub struct Evaluator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for Evaluator<T> {
    fn default() -> Self {
        Evaluator { _marker: PhantomData }
    }
}

impl<T> Evaluator<T>
where
    T: Queryable + Send + Sync + 'static,
{
    /// A fresh evaluator.
    pub fn new() -> Self {
        Evaluator::default()
    }

    /// Compile `expr`, requiring it to evaluate to a filter.
    pub fn evaluate_filter(&self, expr: &Expression) -> Result<Filter<T>> {
        match self.evaluate(expr)? {
            Evaluated::Filter(filter) => Ok(filter),
            _ => Err(TStoreError::InvalidQuery("expected a filter expression".to_string())),
        }
    }

    /// Compile `expr`, requiring it to evaluate to a collector.
    pub fn evaluate_collector(&self, expr: &Expression) -> Result<Collector<T>> {
        match self.evaluate(expr)? {
            Evaluated::Collector(collector) => Ok(collector),
            _ => Err(TStoreError::InvalidQuery("expected a collector expression".to_string())),
        }
    }

    /// Compile `expr`, requiring it to evaluate to a group collector.
    pub fn evaluate_group_collector(&self, expr: &Expression) -> Result<GroupCollector<T>> {
        match self.evaluate(expr)? {
            Evaluated::GroupCollector(group_collector) => Ok(group_collector),
            _ => Err(TStoreError::InvalidQuery("expected a group-collector expression".to_string())),
        }
    }

    fn evaluate(&self, expr: &Expression) -> Result<Evaluated<T>> {
        if expr.is_value {
            let raw = expr
                .value
                .as_deref()
                .ok_or_else(|| TStoreError::InvalidQuery("literal node missing a value".to_string()))?;
            return Ok(Evaluated::Value(parse_literal(expr.output_type, raw)?));
        }

        let operator = expr
            .operator
            .ok_or_else(|| TStoreError::InvalidQuery("operator node missing an operator".to_string()))?;

        match operator {
            Operator::All => {
                require_arity(expr, 0)?;
                Ok(Evaluated::Filter(Box::new(|_: &T| true)))
            }
            Operator::And => {
                require_arity(expr, 2)?;
                let lhs = self.evaluate_filter(&expr.inputs[0])?;
                let rhs = self.evaluate_filter(&expr.inputs[1])?;
                Ok(Evaluated::Filter(Box::new(move |item: &T| lhs(item) && rhs(item))))
            }
            Operator::Or => {
                require_arity(expr, 2)?;
                let lhs = self.evaluate_filter(&expr.inputs[0])?;
                let rhs = self.evaluate_filter(&expr.inputs[1])?;
                Ok(Evaluated::Filter(Box::new(move |item: &T| lhs(item) || rhs(item))))
            }
            Operator::Not => {
                require_arity(expr, 1)?;
                let inner = self.evaluate_filter(&expr.inputs[0])?;
                Ok(Evaluated::Filter(Box::new(move |item: &T| !inner(item))))
            }
            Operator::EqualTo => {
                require_arity(expr, 2)?;
                let name = self.literal_string(&expr.inputs[0])?;
                let target = self.literal_value(&expr.inputs[1])?;
                Ok(Evaluated::Filter(Box::new(move |item: &T| item.attribute(&name) == Some(target.clone()))))
            }
            Operator::Contains => {
                require_arity(expr, 2)?;
                let name = self.literal_string(&expr.inputs[0])?;
                let needle = self.literal_string(&expr.inputs[1])?;
                Ok(Evaluated::Filter(Box::new(move |item: &T| {
                    item.attribute(&name).map(|value| value.to_display_string().contains(&needle)).unwrap_or(false)
                })))
            }
            Operator::LessThan | Operator::LessThanOrEqualTo | Operator::GreaterThan | Operator::GreaterThanOrEqualTo => {
                require_arity(expr, 2)?;
                let name = self.literal_string(&expr.inputs[0])?;
                let target = self.literal_value(&expr.inputs[1])?;
                let accepts: fn(Ordering) -> bool = match operator {
                    Operator::LessThan => |ordering| ordering == Ordering::Less,
                    Operator::LessThanOrEqualTo => |ordering| ordering != Ordering::Greater,
                    Operator::GreaterThan => |ordering| ordering == Ordering::Greater,
                    Operator::GreaterThanOrEqualTo => |ordering| ordering != Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Evaluated::Filter(Box::new(move |item: &T| {
                    item.attribute(&name).and_then(|value| compare_values(&value, &target)).map(accepts).unwrap_or(false)
                })))
            }
            Operator::Find => {
                require_arity(expr, 1)?;
                let filter = self.evaluate_filter(&expr.inputs[0])?;
                Ok(Evaluated::Collector(Box::new(move |items: Vec<T>| {
                    items.into_iter().filter(|item| filter(item)).collect()
                })))
            }
            Operator::Take => {
                require_arity(expr, 2)?;
                let collector = self.evaluate_collector(&expr.inputs[0])?;
                let count = self.literal_int(&expr.inputs[1])?;
                Ok(Evaluated::Collector(Box::new(move |items: Vec<T>| {
                    collector(items).into_iter().take(count.max(0) as usize).collect()
                })))
            }
            Operator::Asc | Operator::Desc => {
                require_arity(expr, 2)?;
                let collector = self.evaluate_collector(&expr.inputs[0])?;
                let name = self.literal_string(&expr.inputs[1])?;
                let ascending = operator == Operator::Asc;
                Ok(Evaluated::Collector(Box::new(move |items: Vec<T>| {
                    let mut collected = collector(items);
                    collected.sort_by(|a, b| {
                        let ordering = match (a.attribute(&name), b.attribute(&name)) {
                            (Some(x), Some(y)) => compare_values(&x, &y).unwrap_or(Ordering::Equal),
                            (Some(_), None) => Ordering::Less,
                            (None, Some(_)) => Ordering::Greater,
                            (None, None) => Ordering::Equal,
                        };
                        if ascending {
                            ordering
                        } else {
                            ordering.reverse()
                        }
                    });
                    collected
                })))
            }
            Operator::GroupBy => {
                require_arity(expr, 2)?;
                let collector = self.evaluate_collector(&expr.inputs[0])?;
                let name = self.literal_string(&expr.inputs[1])?;
                Ok(Evaluated::GroupCollector(Box::new(move |items: Vec<T>| {
                    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
                    for item in collector(items) {
                        let key = item.attribute(&name).map(|value| value.to_display_string()).unwrap_or_default();
                        groups.entry(key).or_default().push(item);
                    }
                    groups
                })))
            }
            Operator::EachGroup => {
                require_arity(expr, 2)?;
                let group_collector = self.evaluate_group_collector(&expr.inputs[0])?;
                let collector = self.evaluate_collector(&expr.inputs[1])?;
                Ok(Evaluated::GroupCollector(Box::new(move |items: Vec<T>| {
                    group_collector(items)
                        .into_iter()
                        .map(|(key, members)| (key, collector(members)))
                        .collect()
                })))
            }
        }
    }

    fn literal_string(&self, expr: &Expression) -> Result<String> {
        match self.evaluate(expr)? {
            Evaluated::Value(Value::String(s)) => Ok(s),
            _ => Err(TStoreError::InvalidQuery("expected a string literal".to_string())),
        }
    }

    fn literal_value(&self, expr: &Expression) -> Result<Value> {
        match self.evaluate(expr)? {
            Evaluated::Value(value) => Ok(value),
            _ => Err(TStoreError::InvalidQuery("expected a value literal".to_string())),
        }
    }

    fn literal_int(&self, expr: &Expression) -> Result<i64> {
        match self.evaluate(expr)? {
            Evaluated::Value(Value::Int(n)) => Ok(n),
            _ => Err(TStoreError::InvalidQuery("expected an int literal".to_string())),
        }
    }
}

fn require_arity(expr: &Expression, arity: usize) -> Result<()> {
    if expr.inputs.len() != arity {
        return Err(TStoreError::InvalidQuery(format!(
            "expected {arity} input(s), found {}",
            expr.inputs.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::DataType;
    use tstore_core::Entity;

    fn attr_name(name: &str) -> Expression {
        Expression::literal(DataType::String, name)
    }

    fn int_lit(n: i64) -> Expression {
        Expression::literal(DataType::Int, n.to_string())
    }

    fn entity_with(id: u64, name: &str) -> Entity {
        let mut entity = Entity::new(id, "person");
        entity.attributes.insert("name".to_string(), Value::String(name.to_string()));
        entity
    }

    #[test]
    fn find_all_returns_every_item() {
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let expr = Expression::operation(
            Operator::Find,
            DataType::CollectorExpression,
            vec![Expression::operation(Operator::All, DataType::FilterExpression, vec![])],
        );
        let collector = evaluator.evaluate_collector(&expr).unwrap();
        let items = vec![entity_with(1, "Ada"), entity_with(2, "Grace")];
        assert_eq!(collector(items).len(), 2);
    }

    #[test]
    fn find_equal_to_filters_by_attribute() {
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let filter_expr = Expression::operation(
            Operator::EqualTo,
            DataType::FilterExpression,
            vec![attr_name("name"), Expression::literal(DataType::String, "Ada")],
        );
        let expr = Expression::operation(Operator::Find, DataType::CollectorExpression, vec![filter_expr]);
        let collector = evaluator.evaluate_collector(&expr).unwrap();
        let items = vec![entity_with(1, "Ada"), entity_with(2, "Grace")];
        let result = collector(items);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn take_truncates_without_failing_on_short_input() {
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let all = Expression::operation(Operator::All, DataType::FilterExpression, vec![]);
        let found = Expression::operation(Operator::Find, DataType::CollectorExpression, vec![all]);
        let expr = Expression::operation(Operator::Take, DataType::CollectorExpression, vec![found, int_lit(10)]);
        let collector = evaluator.evaluate_collector(&expr).unwrap();
        let items = vec![entity_with(1, "Ada")];
        assert_eq!(collector(items).len(), 1);
    }

    #[test]
    fn group_by_partitions_by_selector_value() {
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let all = Expression::operation(Operator::All, DataType::FilterExpression, vec![]);
        let found = Expression::operation(Operator::Find, DataType::CollectorExpression, vec![all]);
        let expr = Expression::operation(Operator::GroupBy, DataType::GroupCollectorExpression, vec![found, attr_name("name")]);
        let group_collector = evaluator.evaluate_group_collector(&expr).unwrap();
        let items = vec![entity_with(1, "Ada"), entity_with(2, "Ada"), entity_with(3, "Grace")];
        let groups = group_collector(items);
        assert_eq!(groups.get("Ada").unwrap().len(), 2);
        assert_eq!(groups.get("Grace").unwrap().len(), 1);
    }

    #[test]
    fn wrong_arity_is_an_invalid_query() {
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let expr = Expression::operation(Operator::Not, DataType::FilterExpression, vec![]);
        assert!(evaluator.evaluate_filter(&expr).is_err());
    }
}
