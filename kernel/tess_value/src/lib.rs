//! Tessera Value - the value and type facade of the expression kernel.
//!
//! The evaluator treats values as opaque, comparable, three-valued data.
//! This crate provides the concrete implementation it consumes:
//! - `Value`: SQL runtime values including `NULL` and the boolean `UNKNOWN`
//! - `SqlType`: type descriptors with the `is_assignable_to` predicate
//! - Operator semantics (arithmetic, comparison, three-valued logic)
//! - Casting between types
//!
//! # NULL Semantics
//!
//! `Value::Null`, `Value::Unknown` and `Value::TypedNull` are all "null" for
//! the purposes of propagation. A null is assignable to every type; casting
//! it yields the null of the target type. Arithmetic and comparison with a
//! null operand yield null; logical operators follow the SQL truth tables and
//! yield `Unknown`.

mod errors;
mod ops;
mod sql_type;
mod value;

pub use errors::ValueError;
pub use sql_type::SqlType;
pub use value::Value;
