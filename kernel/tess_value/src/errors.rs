//! Errors raised by value operations.

use crate::SqlType;

/// Failure of a value-level operation (operator application or cast).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    BinaryTypeMismatch {
        op: &'static str,
        left: SqlType,
        right: SqlType,
    },

    #[error("operator `{op}` cannot be applied to {operand}")]
    UnaryTypeMismatch { op: &'static str, operand: SqlType },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("cannot cast {value} to {target}")]
    InvalidCast { value: String, target: SqlType },

    #[error("expected a boolean operand, found {found}")]
    NotBoolean { found: SqlType },
}
