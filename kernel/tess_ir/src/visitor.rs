//! Structural rewrite pass.
//!
//! A preparer inspects every node top-down and may substitute it before
//! evaluation, for example to qualify bare column names. Nodes the preparer
//! does not claim are rebuilt with the same shape and their operands are
//! visited in turn. A substituted node is returned as-is; the walk does not
//! descend into the replacement.
//!
//! # Example
//!
//! ```text
//! struct Qualify { table: ObjectName }
//!
//! impl ExpressionPreparer for Qualify {
//!     fn can_prepare(&self, expr: &Expression) -> bool {
//!         matches!(expr, Expression::Reference(name) if name.parent().is_none())
//!     }
//!     fn prepare(&mut self, expr: &Expression) -> Expression { ... }
//! }
//! ```

use crate::Expression;

/// Substitutes sub-expressions during [`Expression::prepare`].
pub trait ExpressionPreparer {
    /// `true` if this preparer wants to replace `expr`.
    fn can_prepare(&self, expr: &Expression) -> bool;

    /// Produce the replacement for a node accepted by `can_prepare`.
    fn prepare(&mut self, expr: &Expression) -> Expression;
}

impl Expression {
    /// Rewrite this tree through `preparer`.
    #[must_use]
    pub fn prepare(&self, preparer: &mut dyn ExpressionPreparer) -> Expression {
        if preparer.can_prepare(self) {
            return preparer.prepare(self);
        }
        walk_prepare(preparer, self)
    }
}

/// Rebuild `expr` with every operand passed through `preparer`.
///
/// The node itself is not offered to the preparer.
pub fn walk_prepare(preparer: &mut dyn ExpressionPreparer, expr: &Expression) -> Expression {
    let mut sub = |e: &Expression| Box::new(e.prepare(preparer));
    match expr {
        Expression::Constant(_) | Expression::Reference(_) | Expression::Variable(_) => {
            expr.clone()
        }
        Expression::Parameter => Expression::Parameter,
        Expression::Binary { op, left, right } => Expression::Binary {
            op: *op,
            left: sub(left),
            right: sub(right),
        },
        Expression::Unary { op, operand } => Expression::Unary {
            op: *op,
            operand: sub(operand),
        },
        Expression::Cast { value, target } => Expression::Cast {
            value: sub(value),
            target: target.clone(),
        },
        Expression::Condition {
            test,
            if_true,
            if_false,
        } => Expression::Condition {
            test: sub(test),
            if_true: sub(if_true),
            if_false: sub(if_false),
        },
        Expression::Quantify {
            quantifier,
            op,
            left,
            right,
        } => Expression::Quantify {
            quantifier: *quantifier,
            op: *op,
            left: sub(left),
            right: sub(right),
        },
        Expression::Group(inner) => Expression::Group(sub(inner)),
        Expression::VariableAssign { name, value } => Expression::VariableAssign {
            name: name.clone(),
            value: sub(value),
        },
        Expression::ReferenceAssign { name, value } => Expression::ReferenceAssign {
            name: name.clone(),
            value: sub(value),
        },
        Expression::Function(invoke) => Expression::Function(invoke.map_arguments(|arg| *sub(arg))),
    }
}
