//! Operator and cast semantics for SQL values.
//!
//! Every operation takes its operands by reference and returns a fresh value.
//! Null propagation is uniform:
//! - arithmetic, concatenation and negation return `Null`
//! - relational operators return `Unknown`
//! - `AND`/`OR`/`NOT` follow the three-valued truth tables
//! - `IS`/`IS NOT` are null-safe and always return a definite boolean

use std::cmp::Ordering;

use crate::{SqlType, Value, ValueError};

/// Numeric view of a value, used to unify mixed integer/double arithmetic.
#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Numeric::Int(*n)),
            Value::Double(x) => Some(Numeric::Float(*x)),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "SQL promotes INTEGER to DOUBLE in mixed arithmetic"
    )]
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(n) => n as f64,
            Numeric::Float(x) => x,
        }
    }
}

#[derive(Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    const fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "addition",
            ArithOp::Sub => "subtraction",
            ArithOp::Mul => "multiplication",
            ArithOp::Div => "division",
            ArithOp::Rem => "remainder",
        }
    }
}

fn arithmetic(left: &Value, right: &Value, op: ArithOp) -> Result<Value, ValueError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let (Some(a), Some(b)) = (Numeric::of(left), Numeric::of(right)) else {
        return Err(ValueError::BinaryTypeMismatch {
            op: op.symbol(),
            left: left.sql_type(),
            right: right.sql_type(),
        });
    };

    match (a, b) {
        (Numeric::Int(a), Numeric::Int(b)) => {
            if matches!(op, ArithOp::Div | ArithOp::Rem) && b == 0 {
                return Err(ValueError::DivisionByZero);
            }
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div => a.checked_div(b),
                ArithOp::Rem => a.checked_rem(b),
            };
            result
                .map(Value::Integer)
                .ok_or(ValueError::Overflow {
                    operation: op.name(),
                })
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            if matches!(op, ArithOp::Div | ArithOp::Rem) && b == 0.0 {
                return Err(ValueError::DivisionByZero);
            }
            Ok(Value::Double(match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
                ArithOp::Rem => a % b,
            }))
        }
    }
}

/// Truth value of a logical operand: `Some(b)` for booleans, `None` for nulls.
fn logical_operand(value: &Value) -> Result<Option<bool>, ValueError> {
    match value {
        Value::Boolean(b) => Ok(Some(*b)),
        v if v.is_null() => Ok(None),
        other => Err(ValueError::NotBoolean {
            found: other.sql_type(),
        }),
    }
}

impl Value {
    pub fn add(&self, other: &Value) -> Result<Value, ValueError> {
        arithmetic(self, other, ArithOp::Add)
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, ValueError> {
        arithmetic(self, other, ArithOp::Sub)
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, ValueError> {
        arithmetic(self, other, ArithOp::Mul)
    }

    pub fn divide(&self, other: &Value) -> Result<Value, ValueError> {
        arithmetic(self, other, ArithOp::Div)
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, ValueError> {
        arithmetic(self, other, ArithOp::Rem)
    }

    /// String concatenation (`||`). Arrays concatenate element-wise.
    pub fn concat(&self, other: &Value) -> Result<Value, ValueError> {
        match (self, other) {
            (a, b) if a.is_null() || b.is_null() => Ok(Value::Null),
            (Value::Array(a), Value::Array(b)) => {
                Ok(Value::Array(a.iter().chain(b.iter()).cloned().collect()))
            }
            (Value::Array(_), _) | (_, Value::Array(_)) => Err(ValueError::BinaryTypeMismatch {
                op: "||",
                left: self.sql_type(),
                right: other.sql_type(),
            }),
            (a, b) => Ok(Value::VarChar(format!("{}{}", a.to_text(), b.to_text()))),
        }
    }

    /// Three-valued ordering: `Ok(None)` when either side is null.
    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(None);
        }
        let ordering = match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::VarChar(a), Value::VarChar(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        None => return Ok(None),
                        Some(Ordering::Equal) => {}
                        Some(ord) => return Ok(Some(ord)),
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => match (Numeric::of(a), Numeric::of(b)) {
                (Some(x), Some(y)) => match x.as_f64().partial_cmp(&y.as_f64()) {
                    Some(ord) => ord,
                    None => return Ok(None),
                },
                _ => {
                    return Err(ValueError::BinaryTypeMismatch {
                        op: "compare",
                        left: a.sql_type(),
                        right: b.sql_type(),
                    })
                }
            },
        };
        Ok(Some(ordering))
    }

    pub fn equal(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_eq)))
    }

    pub fn not_equal(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_ne)))
    }

    pub fn less(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_lt)))
    }

    pub fn less_or_equal(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_le)))
    }

    pub fn greater(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_gt)))
    }

    pub fn greater_or_equal(&self, other: &Value) -> Result<Value, ValueError> {
        Ok(Value::truth(self.compare(other)?.map(Ordering::is_ge)))
    }

    /// Null-safe equality (`IS`).
    pub fn is(&self, other: &Value) -> Result<Value, ValueError> {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ok(Value::Boolean(true)),
            (true, false) | (false, true) => Ok(Value::Boolean(false)),
            (false, false) => Ok(Value::Boolean(
                self.compare(other)? == Some(Ordering::Equal),
            )),
        }
    }

    /// Null-safe inequality (`IS NOT`).
    pub fn is_not(&self, other: &Value) -> Result<Value, ValueError> {
        self.is(other)?.not()
    }

    /// Three-valued `AND`: `FALSE` dominates, then `UNKNOWN`.
    pub fn and(&self, other: &Value) -> Result<Value, ValueError> {
        let (a, b) = (logical_operand(self)?, logical_operand(other)?);
        Ok(match (a, b) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Unknown,
        })
    }

    /// Three-valued `OR`: `TRUE` dominates, then `UNKNOWN`.
    pub fn or(&self, other: &Value) -> Result<Value, ValueError> {
        let (a, b) = (logical_operand(self)?, logical_operand(other)?);
        Ok(match (a, b) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Unknown,
        })
    }

    /// Three-valued `NOT`.
    pub fn not(&self) -> Result<Value, ValueError> {
        Ok(Value::truth(logical_operand(self)?.map(|b| !b)))
    }

    pub fn negate(&self) -> Result<Value, ValueError> {
        match self {
            v if v.is_null() => Ok(Value::Null),
            Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or(ValueError::Overflow {
                operation: "negation",
            }),
            Value::Double(x) => Ok(Value::Double(-x)),
            other => Err(ValueError::UnaryTypeMismatch {
                op: "-",
                operand: other.sql_type(),
            }),
        }
    }

    /// Unary plus: identity on numbers.
    pub fn plus(&self) -> Result<Value, ValueError> {
        match self {
            v if v.is_null() => Ok(Value::Null),
            Value::Integer(_) | Value::Double(_) => Ok(self.clone()),
            other => Err(ValueError::UnaryTypeMismatch {
                op: "+",
                operand: other.sql_type(),
            }),
        }
    }

    /// Convert the value to `target`.
    ///
    /// A null converts to the null of `target` (see [`Value::null_of`]).
    /// Wildcard targets leave the value unchanged.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "range is checked before the DOUBLE to INTEGER conversion"
    )]
    pub fn cast_to(&self, target: &SqlType) -> Result<Value, ValueError> {
        if target.is_wildcard() {
            return Ok(self.clone());
        }
        if self.is_null() {
            return Ok(Value::null_of(target));
        }
        let invalid = || ValueError::InvalidCast {
            value: self.to_string(),
            target: target.clone(),
        };

        match (self, target) {
            (Value::Boolean(_), SqlType::Boolean)
            | (Value::Integer(_), SqlType::Integer)
            | (Value::Double(_), SqlType::Double)
            | (Value::VarChar(_), SqlType::VarChar) => Ok(self.clone()),

            (Value::Integer(n), SqlType::Double) => Ok(Value::Double(*n as f64)),
            (Value::Double(x), SqlType::Integer) => {
                let rounded = x.round();
                if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64
                {
                    Ok(Value::Integer(rounded as i64))
                } else {
                    Err(invalid())
                }
            }
            (Value::Integer(n), SqlType::Boolean) => Ok(Value::Boolean(*n != 0)),
            (Value::Boolean(b), SqlType::Integer) => Ok(Value::Integer(i64::from(*b))),

            (Value::VarChar(s), SqlType::Integer) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid()),
            (Value::VarChar(s), SqlType::Double) => s
                .trim()
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| invalid()),
            (Value::VarChar(s), SqlType::Boolean) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" | "t" | "1" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            (Value::Boolean(_) | Value::Integer(_) | Value::Double(_), SqlType::VarChar) => {
                Ok(Value::VarChar(self.to_text()))
            }

            (Value::Array(items), SqlType::Array(element)) => items
                .iter()
                .map(|item| item.cast_to(element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            _ => Err(invalid()),
        }
    }

    /// Plain text form used by concatenation and casts to `VARCHAR`.
    pub fn to_text(&self) -> String {
        match self {
            Value::VarChar(s) => s.clone(),
            Value::Boolean(true) => "true".to_owned(),
            Value::Boolean(false) => "false".to_owned(),
            other => other.to_string(),
        }
    }
}
