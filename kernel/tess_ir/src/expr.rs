//! The SQL expression tree.
//!
//! Expressions are immutable: evaluation and rewriting produce new trees and
//! never mutate an existing node. Each node owns its operands, so a tree has
//! no sharing and no cycles.

use tess_value::{SqlType, Value};

use crate::{BinaryOp, Invoke, IrError, ObjectName, Quantifier, UnaryOp};

/// A SQL expression node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// A literal or an already reduced value.
    Constant(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Cast {
        value: Box<Expression>,
        target: SqlType,
    },
    /// `CASE WHEN test THEN if_true ELSE if_false END`.
    Condition {
        test: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    /// `left op ANY|ALL (right)` where `right` reduces to an array.
    Quantify {
        quantifier: Quantifier,
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Parenthesized expression, transparent to evaluation.
    Group(Box<Expression>),
    /// Column or object reference, resolved through the reference resolver.
    Reference(ObjectName),
    /// Procedural variable, resolved through the variable resolver.
    Variable(String),
    VariableAssign {
        name: String,
        value: Box<Expression>,
    },
    ReferenceAssign {
        name: ObjectName,
        value: Box<Expression>,
    },
    /// Function or procedure call.
    Function(Invoke),
    /// Unbound placeholder. Never reducible.
    Parameter,
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn null() -> Self {
        Expression::Constant(Value::Null)
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn subtract(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Subtract, left, right)
    }

    pub fn multiply(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Multiply, left, right)
    }

    pub fn equal(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Equal, left, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Self::unary(UnaryOp::Not, operand)
    }

    pub fn negate(operand: Expression) -> Self {
        Self::unary(UnaryOp::Negate, operand)
    }

    pub fn cast(value: Expression, target: SqlType) -> Self {
        Expression::Cast {
            value: Box::new(value),
            target,
        }
    }

    pub fn condition(test: Expression, if_true: Expression, if_false: Expression) -> Self {
        Expression::Condition {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    /// Build `left op ANY|ALL (right)`.
    ///
    /// Fails unless `op` is one of the six relational operators.
    pub fn quantify(
        quantifier: Quantifier,
        op: BinaryOp,
        left: Expression,
        right: Expression,
    ) -> Result<Self, IrError> {
        if !op.is_relational() {
            return Err(IrError::NotRelational { op });
        }
        Ok(Expression::Quantify {
            quantifier,
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn group(inner: Expression) -> Self {
        Expression::Group(Box::new(inner))
    }

    pub fn reference(name: impl Into<ObjectName>) -> Self {
        Expression::Reference(name.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn assign_variable(name: impl Into<String>, value: Expression) -> Self {
        Expression::VariableAssign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn assign_reference(name: impl Into<ObjectName>, value: Expression) -> Self {
        Expression::ReferenceAssign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn function(invoke: Invoke) -> Self {
        Expression::Function(invoke)
    }

    pub fn parameter() -> Self {
        Expression::Parameter
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// The value of a `Constant` node.
    #[inline]
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expression::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Consume a `Constant` node, returning the node itself otherwise.
    pub fn into_constant(self) -> Result<Value, Expression> {
        match self {
            Expression::Constant(value) => Ok(value),
            other => Err(other),
        }
    }

    /// `true` for the bare `*` reference of `COUNT(*)`.
    pub fn is_glob(&self) -> bool {
        matches!(self, Expression::Reference(name) if name.is_glob())
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Constant(value)
    }
}
