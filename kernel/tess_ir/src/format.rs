//! Textual rendering of expressions and invocations.
//!
//! The output is SQL-like and stable, used for diagnostics and for comparing
//! trees by their rendered form. It is not guaranteed to round-trip through a
//! parser.

use std::fmt;

use crate::{Argument, BinaryOp, Expression, Invoke};

/// In-memory output buffer for `append_to`.
#[derive(Default)]
pub struct SqlFormatter {
    buffer: String,
}

impl SqlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment.
    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Append anything with a `Display` form.
    pub fn append_display(&mut self, value: &impl fmt::Display) {
        use fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.buffer, "{value}");
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume the formatter, returning the rendered text.
    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Run `render` against a fresh formatter and return its output.
pub(crate) fn render(render: impl FnOnce(&mut SqlFormatter)) -> String {
    let mut formatter = SqlFormatter::new();
    render(&mut formatter);
    formatter.finish()
}

impl Expression {
    /// Render this expression into `formatter`.
    pub fn append_to(&self, formatter: &mut SqlFormatter) {
        match self {
            Expression::Constant(value) => formatter.append_display(value),
            Expression::Binary { op, left, right } => {
                append_operand(formatter, left, *op, false);
                formatter.append(" ");
                formatter.append(op.as_symbol());
                formatter.append(" ");
                append_operand(formatter, right, *op, true);
            }
            Expression::Unary { op, operand } => {
                formatter.append(op.as_symbol());
                if matches!(operand.as_ref(), Expression::Binary { .. }) {
                    formatter.append("(");
                    operand.append_to(formatter);
                    formatter.append(")");
                } else {
                    operand.append_to(formatter);
                }
            }
            Expression::Cast { value, target } => {
                formatter.append("CAST(");
                value.append_to(formatter);
                formatter.append(" AS ");
                formatter.append_display(target);
                formatter.append(")");
            }
            Expression::Condition {
                test,
                if_true,
                if_false,
            } => {
                formatter.append("CASE WHEN ");
                test.append_to(formatter);
                formatter.append(" THEN ");
                if_true.append_to(formatter);
                formatter.append(" ELSE ");
                if_false.append_to(formatter);
                formatter.append(" END");
            }
            Expression::Quantify {
                quantifier,
                op,
                left,
                right,
            } => {
                append_operand(formatter, left, *op, false);
                formatter.append(" ");
                formatter.append(op.as_symbol());
                formatter.append(" ");
                formatter.append(quantifier.as_keyword());
                formatter.append("(");
                right.append_to(formatter);
                formatter.append(")");
            }
            Expression::Group(inner) => {
                formatter.append("(");
                inner.append_to(formatter);
                formatter.append(")");
            }
            Expression::Reference(name) => formatter.append_display(name),
            Expression::Variable(name) => {
                formatter.append(":");
                formatter.append(name);
            }
            Expression::VariableAssign { name, value } => {
                formatter.append(":");
                formatter.append(name);
                formatter.append(" = ");
                value.append_to(formatter);
            }
            Expression::ReferenceAssign { name, value } => {
                formatter.append_display(name);
                formatter.append(" = ");
                value.append_to(formatter);
            }
            Expression::Function(invoke) => invoke.append_to(formatter),
            Expression::Parameter => formatter.append("?"),
        }
    }
}

/// Render a binary operand, parenthesizing it when it binds looser than
/// `parent`. Right operands of equal precedence are parenthesized too, since
/// the operators are left-associative.
fn append_operand(
    formatter: &mut SqlFormatter,
    operand: &Expression,
    parent: BinaryOp,
    is_right: bool,
) {
    let needs_parens = match operand {
        Expression::Binary { op, .. } => {
            op.precedence() < parent.precedence()
                || (is_right && op.precedence() == parent.precedence())
        }
        _ => false,
    };
    if needs_parens {
        formatter.append("(");
        operand.append_to(formatter);
        formatter.append(")");
    } else {
        operand.append_to(formatter);
    }
}

impl Invoke {
    /// Render as `name(arg, ...)`, named arguments as `name => value`.
    pub fn append_to(&self, formatter: &mut SqlFormatter) {
        formatter.append_display(self.method());
        formatter.append("(");
        for (i, argument) in self.arguments().iter().enumerate() {
            if i > 0 {
                formatter.append(", ");
            }
            argument.append_to(formatter);
        }
        formatter.append(")");
    }
}

impl Argument {
    pub fn append_to(&self, formatter: &mut SqlFormatter) {
        if let Some(name) = self.name() {
            formatter.append(name);
            formatter.append(" => ");
        }
        self.value().append_to(formatter);
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(|formatter| self.append_to(formatter)))
    }
}
