//! Errors raised while building expression and invocation trees.

use crate::BinaryOp;

/// A malformed tree was rejected at construction time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// Positional and named arguments were mixed in one invocation.
    #[error("cannot mix positional and named arguments in a call to {method}")]
    MixedArguments { method: String },

    #[error("argument `{argument}` given more than once in a call to {method}")]
    DuplicateArgument { method: String, argument: String },

    #[error("operator `{}` cannot be quantified", op.as_symbol())]
    NotRelational { op: BinaryOp },
}
