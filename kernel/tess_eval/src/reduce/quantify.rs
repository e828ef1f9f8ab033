//! Quantified comparisons: `left op ANY (array)` and `left op ALL (array)`.

use tess_ir::{BinaryOp, Expression, IrError, Quantifier};
use tess_value::Value;

use super::apply_binary;
use crate::errors::{not_an_array, EvalResult};
use crate::{EvalEnv, Reduce};

pub(super) fn reduce_quantify(
    quantifier: Quantifier,
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    env: &EvalEnv<'_>,
) -> EvalResult<Expression> {
    // Trees built without `Expression::quantify` skip its operator check.
    if !op.is_relational() {
        return Err(IrError::NotRelational { op }.into());
    }
    let left = left.reduce_to_constant(env)?;
    let elements = match right.reduce_to_constant(env)? {
        Value::Array(elements) => elements,
        value if value.is_null() => return Ok(Expression::Constant(Value::Unknown)),
        other => return Err(not_an_array(right, other.sql_type())),
    };
    Ok(Expression::Constant(quantify(quantifier, op, &left, &elements)?))
}

/// Compare `left` against each element, stopping at the first deciding one.
///
/// `ANY` stops at the first `TRUE`, `ALL` at the first `FALSE`. Either stops
/// at the first `UNKNOWN` met before that. An empty array is `FALSE` for
/// `ANY` and `TRUE` for `ALL`.
pub(super) fn quantify(
    quantifier: Quantifier,
    op: BinaryOp,
    left: &Value,
    elements: &[Value],
) -> EvalResult<Value> {
    let decisive = matches!(quantifier, Quantifier::Any);
    for element in elements {
        match apply_binary(op, left, element)? {
            Value::Boolean(outcome) if outcome == decisive => {
                tracing::trace!(quantifier = quantifier.as_keyword(), "short-circuit");
                return Ok(Value::Boolean(decisive));
            }
            Value::Boolean(_) => {}
            _ => return Ok(Value::Unknown),
        }
    }
    Ok(Value::Boolean(!decisive))
}
