#![warn(missing_docs)]
//! TStore's query language: the [`Expression`] tree, [`Operator`] and
//! [`DataType`] enums, literal parsing, attribute selectors, and the
//! [`Evaluator`]/[`Executor`] that compile and run them (spec §4.9).

pub mod evaluator;
pub mod executor;
pub mod expression;
pub mod literal;
pub mod selector;

pub use evaluator::{Collector, Evaluator, Filter, GroupCollector};
pub use executor::Executor;
pub use expression::{DataType, Expression, Operator};
pub use literal::{compare_values, parse_literal};
pub use selector::Queryable;
