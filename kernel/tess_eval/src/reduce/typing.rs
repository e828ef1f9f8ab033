//! Static expression types.
//!
//! Typing never evaluates anything. Names the environment cannot type
//! (missing resolver, unknown reference, unresolved method) are `ANY`, so
//! that the decision is left to reduction.

use tess_ir::{BinaryOp, Expression, UnaryOp};
use tess_value::SqlType;

use crate::errors::EvalResult;
use crate::{EvalEnv, Reduce};

pub(super) fn static_type(expr: &Expression, env: &EvalEnv<'_>) -> EvalResult<SqlType> {
    let ty = match expr {
        Expression::Constant(value) => value.sql_type(),
        Expression::Binary { op, left, right } => {
            if op.is_boolean() {
                SqlType::Boolean
            } else {
                let left = left.get_type(env)?;
                let right = right.get_type(env)?;
                binary_type(*op, &left, &right)
            }
        }
        Expression::Unary { op, operand } => match op {
            UnaryOp::Not => SqlType::Boolean,
            UnaryOp::Negate | UnaryOp::Plus => operand.get_type(env)?,
        },
        Expression::Cast { target, .. } => target.clone(),
        Expression::Condition {
            if_true, if_false, ..
        } => {
            let ty = if_true.get_type(env)?;
            if ty.is_wildcard() {
                if_false.get_type(env)?
            } else {
                ty
            }
        }
        Expression::Quantify { .. } => SqlType::Boolean,
        Expression::Group(inner) => inner.get_type(env)?,
        Expression::Reference(name) | Expression::ReferenceAssign { name, .. } => env
            .references()
            .and_then(|refs| refs.resolve_type(name, env.ignore_case()))
            .unwrap_or(SqlType::Any),
        Expression::Variable(name) | Expression::VariableAssign { name, .. } => env
            .variables()
            .and_then(|vars| vars.resolve_variable(name, env.ignore_case()))
            .map_or(SqlType::Any, |var| var.var_type()),
        Expression::Function(invoke) => match env.methods() {
            Some(methods) => methods
                .resolve_method(env, invoke)?
                .and_then(|method| method.info().return_type().cloned())
                .unwrap_or(SqlType::Any),
            None => SqlType::Any,
        },
        Expression::Parameter => SqlType::Any,
    };
    Ok(ty)
}

fn binary_type(op: BinaryOp, left: &SqlType, right: &SqlType) -> SqlType {
    match (op, left, right) {
        (BinaryOp::Concat, SqlType::Array(_), _) => left.clone(),
        (BinaryOp::Concat, _, SqlType::Array(_)) => right.clone(),
        (BinaryOp::Concat, _, _) => SqlType::VarChar,
        _ => left.arithmetic_result(right),
    }
}
