//! Expression reduction.
//!
//! Reduction evaluates a tree top-down to a single `Constant`. Operands are
//! reduced before their operator is applied, one at a time and in tree
//! order. A reduction either produces a constant or fails; partial results
//! are never returned.
//!
//! # Null Handling
//!
//! - Operators defer to the value facade, which propagates `NULL`/`UNKNOWN`
//! - A `CASE` whose test is null yields the test value; neither branch runs
//! - Unresolved references and variables reduce to `UNKNOWN`

mod quantify;
mod typing;

use tess_ir::{BinaryOp, Expression, Invoke, UnaryOp};
use tess_value::{SqlType, Value, ValueError};

use crate::errors::{
    no_such_method, non_boolean_test, not_authorized, not_constant, unbound_parameter,
    undeclared_variable, EvalResult,
};
use crate::{with_stack_headroom, EvalEnv, UndeclaredAssignment};

/// Evaluation entry points for expressions.
pub trait Reduce {
    /// Reduce to a new tree. Constants reduce to themselves.
    fn reduce(&self, env: &EvalEnv<'_>) -> EvalResult<Expression>;

    /// Reduce and require the result to be a `Constant`.
    fn reduce_to_constant(&self, env: &EvalEnv<'_>) -> EvalResult<Value>;

    /// Static type of the expression, without evaluating it.
    fn get_type(&self, env: &EvalEnv<'_>) -> EvalResult<SqlType>;
}

impl Reduce for Expression {
    fn reduce(&self, env: &EvalEnv<'_>) -> EvalResult<Expression> {
        with_stack_headroom(|| {
            let _guard = env.enter()?;
            reduce_expr(self, env)
        })
    }

    fn reduce_to_constant(&self, env: &EvalEnv<'_>) -> EvalResult<Value> {
        self.reduce(env)?
            .into_constant()
            .map_err(|expr| not_constant(&expr))
    }

    fn get_type(&self, env: &EvalEnv<'_>) -> EvalResult<SqlType> {
        with_stack_headroom(|| typing::static_type(self, env))
    }
}

fn reduce_expr(expr: &Expression, env: &EvalEnv<'_>) -> EvalResult<Expression> {
    match expr {
        Expression::Constant(_) => Ok(expr.clone()),
        Expression::Binary { op, left, right } => {
            let left = left.reduce_to_constant(env)?;
            let right = right.reduce_to_constant(env)?;
            Ok(Expression::Constant(apply_binary(*op, &left, &right)?))
        }
        Expression::Unary { op, operand } => {
            let operand = operand.reduce_to_constant(env)?;
            Ok(Expression::Constant(apply_unary(*op, &operand)?))
        }
        Expression::Cast { value, target } => {
            let value = value.reduce_to_constant(env)?;
            Ok(Expression::Constant(value.cast_to(target)?))
        }
        Expression::Condition {
            test,
            if_true,
            if_false,
        } => reduce_condition(test, if_true, if_false, env),
        Expression::Quantify {
            quantifier,
            op,
            left,
            right,
        } => quantify::reduce_quantify(*quantifier, *op, left, right, env),
        Expression::Group(inner) => inner.reduce(env),
        Expression::Reference(name) => {
            let references = env.require_references()?;
            let value = references
                .resolve_reference(name, env.ignore_case())
                .unwrap_or(Value::Unknown);
            Ok(Expression::Constant(value))
        }
        Expression::Variable(name) => {
            let variables = env.require_variables()?;
            let value = match variables.resolve_variable(name, env.ignore_case()) {
                Some(variable) => variable.evaluate(env)?,
                None => Value::Unknown,
            };
            Ok(Expression::Constant(value))
        }
        Expression::VariableAssign { name, value } => {
            let variables = env.require_variables()?;
            let Some(variable) = variables.resolve_variable(name, env.ignore_case()) else {
                return match env.options().undeclared_assignment {
                    UndeclaredAssignment::Unknown => {
                        tracing::trace!(%name, "assignment to undeclared variable ignored");
                        Ok(Expression::Constant(Value::Unknown))
                    }
                    UndeclaredAssignment::Reject => Err(undeclared_variable(name)),
                };
            };
            let value = value.reduce_to_constant(env)?;
            Ok(Expression::Constant(variable.set_value(value, env)?))
        }
        Expression::ReferenceAssign { name, value } => {
            let references = env.require_references()?;
            let value = value.reduce_to_constant(env)?;
            let stored = references.assign_reference(name, value, env.ignore_case())?;
            Ok(Expression::Constant(stored))
        }
        Expression::Function(invoke) => reduce_function(invoke, env).map(Expression::Constant),
        Expression::Parameter => Err(unbound_parameter()),
    }
}

/// `CASE WHEN test THEN if_true ELSE if_false END`.
fn reduce_condition(
    test: &Expression,
    if_true: &Expression,
    if_false: &Expression,
    env: &EvalEnv<'_>,
) -> EvalResult<Expression> {
    let test_type = test.get_type(env)?;
    if !test_type.is_assignable_to(&SqlType::Boolean) {
        return Err(non_boolean_test(test, test_type));
    }

    match test.reduce_to_constant(env)? {
        Value::Boolean(true) => if_true.reduce(env),
        Value::Boolean(false) => if_false.reduce(env),
        outcome if outcome.is_null() => {
            tracing::trace!(test = %test, "condition is null, skipping both branches");
            Ok(Expression::Constant(outcome))
        }
        other => Err(non_boolean_test(test, other.sql_type())),
    }
}

/// Resolve, authorize and execute a function call.
fn reduce_function(invoke: &Invoke, env: &EvalEnv<'_>) -> EvalResult<Value> {
    let methods = env.require_methods()?;
    let method = methods
        .resolve_method(env, invoke)?
        .ok_or_else(|| no_such_method(invoke.method()))?;

    if !method.info().is_system() {
        let authorizer = env.require_authorizer()?;
        if !authorizer.can_execute(method.name()) {
            return Err(not_authorized(method.name()));
        }
    }

    let result = method
        .execute(env, invoke)
        .map_err(|err| err.with_note(format!("while executing {invoke}")))?;
    Ok(result.into_value())
}

/// Apply a binary operator to two reduced operands.
fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ValueError> {
    match op {
        BinaryOp::Add => left.add(right),
        BinaryOp::Subtract => left.subtract(right),
        BinaryOp::Multiply => left.multiply(right),
        BinaryOp::Divide => left.divide(right),
        BinaryOp::Modulo => left.modulo(right),
        BinaryOp::Concat => left.concat(right),
        BinaryOp::Equal => left.equal(right),
        BinaryOp::NotEqual => left.not_equal(right),
        BinaryOp::Less => left.less(right),
        BinaryOp::LessOrEqual => left.less_or_equal(right),
        BinaryOp::Greater => left.greater(right),
        BinaryOp::GreaterOrEqual => left.greater_or_equal(right),
        BinaryOp::And => left.and(right),
        BinaryOp::Or => left.or(right),
        BinaryOp::Is => left.is(right),
        BinaryOp::IsNot => left.is_not(right),
    }
}

fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, ValueError> {
    match op {
        UnaryOp::Not => operand.not(),
        UnaryOp::Negate => operand.negate(),
        UnaryOp::Plus => operand.plus(),
    }
}

#[cfg(test)]
mod tests;
