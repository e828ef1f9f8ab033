//! SQL runtime values.

use std::fmt;

use crate::SqlType;

/// A SQL runtime value.
///
/// `Unknown` is the third truth value of SQL boolean logic. It behaves like
/// `Null` under propagation but carries the `BOOLEAN` type. `TypedNull` is a
/// null of a declared type, produced by casts and by typed method results.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Unknown,
    TypedNull(SqlType),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    VarChar(String),
    Array(Vec<Value>),
}

impl Value {
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Value::Boolean(b)
    }

    #[inline]
    pub const fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    #[inline]
    pub const fn double(f: f64) -> Self {
        Value::Double(f)
    }

    pub fn varchar(s: impl Into<String>) -> Self {
        Value::VarChar(s.into())
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Map a three-valued comparison outcome onto a value.
    #[inline]
    pub fn truth(outcome: Option<bool>) -> Self {
        match outcome {
            Some(b) => Value::Boolean(b),
            None => Value::Unknown,
        }
    }

    /// The null of type `ty`.
    ///
    /// Wildcard types give the untyped `Null`; `BOOLEAN` gives `Unknown`.
    pub fn null_of(ty: &SqlType) -> Self {
        match ty {
            SqlType::Null | SqlType::Any => Value::Null,
            SqlType::Boolean => Value::Unknown,
            other => Value::TypedNull(other.clone()),
        }
    }

    /// `true` for `Null`, `Unknown` and `TypedNull`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Unknown | Value::TypedNull(_))
    }

    /// Whether this value may be stored where `target` is expected.
    ///
    /// Every null is storable anywhere, whatever type it carries.
    pub fn is_assignable_to(&self, target: &SqlType) -> bool {
        self.is_null() || self.sql_type().is_assignable_to(target)
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Boolean(false))
    }

    /// Boolean payload, or `None` for anything else.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::VarChar(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The runtime type of this value.
    ///
    /// An array takes the type of its first non-null element; an empty or
    /// all-null array is `NULL[]`.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Value::Null => SqlType::Null,
            Value::TypedNull(ty) => ty.clone(),
            Value::Unknown | Value::Boolean(_) => SqlType::Boolean,
            Value::Integer(_) => SqlType::Integer,
            Value::Double(_) => SqlType::Double,
            Value::VarChar(_) => SqlType::VarChar,
            Value::Array(items) => SqlType::array_of(
                items
                    .iter()
                    .find(|item| !item.is_null())
                    .map_or(SqlType::Null, Value::sql_type),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::VarChar(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::VarChar(s)
    }
}

/// Renders the value as a SQL literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::TypedNull(_) => write!(f, "NULL"),
            Value::Unknown => write!(f, "UNKNOWN"),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Double(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::VarChar(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Array(items) => {
                write!(f, "ARRAY[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
