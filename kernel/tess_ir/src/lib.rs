//! Tessera IR - expression and invocation trees for the evaluation kernel.
//!
//! This crate holds the data side of the kernel:
//! - `Expression`: the immutable, closed expression tree
//! - `Invoke` / `Argument`: call sites, positional or named
//! - `ObjectName`: qualified names for references and methods
//! - Operators and quantifiers
//! - The structural rewrite pass (`ExpressionPreparer`)
//! - Textual rendering (`SqlFormatter`, `append_to`)
//!
//! Evaluation lives in `tess_eval`; nothing here resolves names or runs
//! methods.

mod errors;
mod expr;
pub mod format;
mod invoke;
mod name;
mod operators;
pub mod visitor;

pub use errors::IrError;
pub use expr::Expression;
pub use format::SqlFormatter;
pub use invoke::{Argument, Invoke};
pub use name::ObjectName;
pub use operators::{BinaryOp, Quantifier, UnaryOp};
pub use visitor::ExpressionPreparer;
