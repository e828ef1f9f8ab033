//! SQL type descriptors.
//!
//! Types take part in method resolution through compatibility rather than
//! identity: two signatures match when each pair of parameter types is
//! mutually assignable (see [`SqlType::is_compatible_with`]).

use std::fmt;

/// A SQL type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SqlType {
    /// Type of the `NULL` literal. Assignable to and from every type.
    Null,
    /// Polymorphic type used by declarations that accept anything.
    Any,
    Boolean,
    Integer,
    Double,
    VarChar,
    /// Homogeneous array of the element type.
    Array(Box<SqlType>),
}

impl SqlType {
    /// Create an array type of the given element type.
    pub fn array_of(element: SqlType) -> Self {
        SqlType::Array(Box::new(element))
    }

    /// `true` for `INTEGER` and `DOUBLE`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, SqlType::Integer | SqlType::Double)
    }

    /// `true` for the wildcard types `NULL` and `ANY`.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, SqlType::Null | SqlType::Any)
    }

    /// Whether a value of this type may be stored where `target` is expected.
    ///
    /// - `NULL` and `ANY` match everything, in both positions
    /// - numeric types are assignable to each other
    /// - arrays are assignable when their element types are
    pub fn is_assignable_to(&self, target: &SqlType) -> bool {
        match (self, target) {
            (a, b) if a.is_wildcard() || b.is_wildcard() => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (SqlType::Boolean, SqlType::Boolean) | (SqlType::VarChar, SqlType::VarChar) => true,
            (SqlType::Array(a), SqlType::Array(b)) => a.is_assignable_to(b),
            _ => false,
        }
    }

    /// Mutual assignability, the equality used by signature matching.
    pub fn is_compatible_with(&self, other: &SqlType) -> bool {
        self.is_assignable_to(other) && other.is_assignable_to(self)
    }

    /// Result type of an arithmetic operator applied to `self` and `other`.
    ///
    /// `INTEGER op INTEGER` stays `INTEGER`; any `DOUBLE` operand promotes.
    /// Wildcards defer to the other side.
    pub fn arithmetic_result(&self, other: &SqlType) -> SqlType {
        match (self, other) {
            (SqlType::Integer, SqlType::Integer) => SqlType::Integer,
            (SqlType::Double, _) | (_, SqlType::Double) => SqlType::Double,
            (a, b) if a.is_wildcard() => b.clone(),
            (a, _) => a.clone(),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Null => write!(f, "NULL"),
            SqlType::Any => write!(f, "ANY"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::Double => write!(f, "DOUBLE"),
            SqlType::VarChar => write!(f, "VARCHAR"),
            SqlType::Array(element) => write!(f, "{element}[]"),
        }
    }
}
