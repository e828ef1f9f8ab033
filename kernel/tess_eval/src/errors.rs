//! Evaluation errors and their centralized constructors.
//!
//! Every failure raised by reduction, binding, resolution and execution is an
//! [`EvalError`] carrying a structured [`EvalErrorKind`]. Callers match on the
//! kind, or on its coarse [`ErrorCategory`], never on the message text.
//!
//! Errors are built through the factory functions in this module so that
//! every message lives in one place.

use std::fmt;

use tess_ir::{IrError, ObjectName};
use tess_value::{SqlType, ValueError};

/// Result of an evaluation step.
pub type EvalResult<T = tess_value::Value> = Result<T, EvalError>;

/// Coarse classification of evaluation failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Arguments do not fit the declared parameters, or a declaration is
    /// malformed.
    Binding,
    /// A method or a capability could not be found.
    Resolution,
    /// An expression could not be reduced to a constant.
    Reduction,
    /// The caller may not execute the method.
    Authorization,
    /// A produced value does not fit its declared type.
    TypeCompatibility,
    /// Evaluation was cancelled or ran past its deadline.
    Interrupted,
}

/// A capability an evaluation environment may provide.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    References,
    Variables,
    Methods,
    Group,
    Authorization,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::References => "reference resolver",
            Capability::Variables => "variable resolver",
            Capability::Methods => "method resolver",
            Capability::Group => "group resolver",
            Capability::Authorization => "authorizer",
        })
    }
}

/// Typed evaluation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Binding
    ArgumentCountMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    UnknownParameter {
        method: String,
        parameter: String,
    },
    MissingParameter {
        method: String,
        parameter: String,
    },
    DuplicateParameter {
        method: String,
        parameter: String,
    },
    OutParameterOnFunction {
        method: String,
        parameter: String,
    },
    InvalidAggregate {
        method: String,
    },
    NotAProcedure {
        method: String,
    },
    NotAnOutput {
        method: String,
        parameter: String,
    },
    NotAFunction {
        method: String,
    },
    Ir(IrError),

    // Resolution
    NoSuchMethod {
        method: String,
    },
    NoResolver {
        capability: Capability,
    },

    // Reduction
    NotConstant {
        expression: String,
    },
    NonBooleanTest {
        expression: String,
        found: SqlType,
    },
    NotAnArray {
        expression: String,
        found: SqlType,
    },
    UnboundParameter,
    RowOutOfRange {
        row: usize,
        size: usize,
    },
    UndeclaredVariable {
        name: String,
    },
    UndefinedReference {
        name: String,
    },
    ReadOnlyReference {
        name: String,
    },
    DepthExceeded {
        limit: usize,
    },
    Value(ValueError),
    Custom {
        message: String,
    },

    // Authorization
    NotAuthorized {
        method: String,
    },

    // Type compatibility
    IncompatibleReturn {
        method: String,
        expected: SqlType,
        found: SqlType,
    },
    IncompatibleOutput {
        method: String,
        parameter: String,
        expected: SqlType,
        found: SqlType,
    },
    IncompatibleAssignment {
        target: String,
        expected: SqlType,
        found: SqlType,
    },

    // Interrupted
    Cancelled,
    DeadlineExceeded,
}

impl EvalErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArgumentCountMismatch { .. }
            | Self::UnknownParameter { .. }
            | Self::MissingParameter { .. }
            | Self::DuplicateParameter { .. }
            | Self::OutParameterOnFunction { .. }
            | Self::InvalidAggregate { .. }
            | Self::NotAProcedure { .. }
            | Self::NotAnOutput { .. }
            | Self::NotAFunction { .. } => ErrorCategory::Binding,
            Self::Ir(IrError::NotRelational { .. }) => ErrorCategory::Reduction,
            Self::Ir(_) => ErrorCategory::Binding,
            Self::NoSuchMethod { .. } | Self::NoResolver { .. } => ErrorCategory::Resolution,
            Self::NotConstant { .. }
            | Self::NonBooleanTest { .. }
            | Self::NotAnArray { .. }
            | Self::UnboundParameter
            | Self::RowOutOfRange { .. }
            | Self::UndeclaredVariable { .. }
            | Self::UndefinedReference { .. }
            | Self::ReadOnlyReference { .. }
            | Self::DepthExceeded { .. }
            | Self::Value(_)
            | Self::Custom { .. } => ErrorCategory::Reduction,
            Self::NotAuthorized { .. } => ErrorCategory::Authorization,
            Self::IncompatibleReturn { .. }
            | Self::IncompatibleOutput { .. }
            | Self::IncompatibleAssignment { .. } => ErrorCategory::TypeCompatibility,
            Self::Cancelled | Self::DeadlineExceeded => ErrorCategory::Interrupted,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Binding
            Self::ArgumentCountMismatch {
                method,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{method} expects {expected} {arg_word}, got {got}")
            }
            Self::UnknownParameter { method, parameter } => {
                write!(f, "{method} has no parameter named `{parameter}`")
            }
            Self::MissingParameter { method, parameter } => {
                write!(f, "missing required parameter `{parameter}` in call to {method}")
            }
            Self::DuplicateParameter { method, parameter } => {
                write!(f, "parameter `{parameter}` declared more than once on {method}")
            }
            Self::OutParameterOnFunction { method, parameter } => {
                write!(f, "function {method} cannot declare output parameter `{parameter}`")
            }
            Self::InvalidAggregate { method } => {
                write!(f, "aggregate {method} must be a function of exactly one parameter")
            }
            Self::NotAProcedure { method } => {
                write!(f, "{method} is a function and has no output parameters")
            }
            Self::NotAnOutput { method, parameter } => {
                write!(f, "parameter `{parameter}` of {method} is not an output")
            }
            Self::NotAFunction { method } => {
                write!(f, "{method} is a procedure and cannot return a value")
            }
            Self::Ir(err) => write!(f, "{err}"),

            // Resolution
            Self::NoSuchMethod { method } => {
                write!(f, "no method {method} matches the given arguments")
            }
            Self::NoResolver { capability } => {
                write!(f, "no {capability} is available in this context")
            }

            // Reduction
            Self::NotConstant { expression } => {
                write!(f, "could not reduce `{expression}` to a constant")
            }
            Self::NonBooleanTest { expression, found } => {
                write!(f, "condition `{expression}` must be BOOLEAN, found {found}")
            }
            Self::NotAnArray { expression, found } => {
                write!(f, "`{expression}` must be an array, found {found}")
            }
            Self::UnboundParameter => write!(f, "cannot evaluate an unbound parameter"),
            Self::RowOutOfRange { row, size } => {
                write!(f, "row {row} is out of range for a group of {size} rows")
            }
            Self::UndeclaredVariable { name } => write!(f, "undeclared variable :{name}"),
            Self::UndefinedReference { name } => write!(f, "undefined reference {name}"),
            Self::ReadOnlyReference { name } => write!(f, "cannot assign to reference {name}"),
            Self::DepthExceeded { limit } => {
                write!(f, "maximum expression depth exceeded (limit: {limit})")
            }
            Self::Value(err) => write!(f, "{err}"),
            Self::Custom { message } => write!(f, "{message}"),

            // Authorization
            Self::NotAuthorized { method } => {
                write!(f, "not authorized to execute {method}")
            }

            // Type compatibility
            Self::IncompatibleReturn {
                method,
                expected,
                found,
            } => write!(f, "{method} returned {found}, which is not assignable to {expected}"),
            Self::IncompatibleOutput {
                method,
                parameter,
                expected,
                found,
            } => write!(
                f,
                "output `{parameter}` of {method} expects {expected}, got {found}"
            ),
            Self::IncompatibleAssignment {
                target,
                expected,
                found,
            } => write!(f, "cannot assign {found} to {target} of type {expected}"),

            // Interrupted
            Self::Cancelled => write!(f, "evaluation cancelled"),
            Self::DeadlineExceeded => write!(f, "evaluation deadline exceeded"),
        }
    }
}

/// Secondary context attached to an error, innermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an error with a free-form message.
    ///
    /// Method bodies use this for their own failures. Prefer a factory
    /// function when a structured kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    #[cold]
    fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            notes: Vec::new(),
        }
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Add a context note to this error.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(EvalNote::new(note));
        self
    }
}

impl From<ValueError> for EvalError {
    fn from(err: ValueError) -> Self {
        Self::from_kind(EvalErrorKind::Value(err))
    }
}

impl From<IrError> for EvalError {
    fn from(err: IrError) -> Self {
        Self::from_kind(EvalErrorKind::Ir(err))
    }
}

// Binding Errors

#[cold]
pub fn argument_count_mismatch(method: &ObjectName, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentCountMismatch {
        method: method.full_name(),
        expected,
        got,
    })
}

#[cold]
pub fn unknown_parameter(method: &ObjectName, parameter: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownParameter {
        method: method.full_name(),
        parameter: parameter.to_owned(),
    })
}

#[cold]
pub fn missing_parameter(method: &ObjectName, parameter: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingParameter {
        method: method.full_name(),
        parameter: parameter.to_owned(),
    })
}

#[cold]
pub fn duplicate_parameter(method: &ObjectName, parameter: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateParameter {
        method: method.full_name(),
        parameter: parameter.to_owned(),
    })
}

#[cold]
pub fn out_parameter_on_function(method: &ObjectName, parameter: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OutParameterOnFunction {
        method: method.full_name(),
        parameter: parameter.to_owned(),
    })
}

#[cold]
pub fn invalid_aggregate(method: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidAggregate {
        method: method.full_name(),
    })
}

#[cold]
pub fn not_a_procedure(method: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAProcedure {
        method: method.full_name(),
    })
}

#[cold]
pub fn not_an_output(method: &ObjectName, parameter: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnOutput {
        method: method.full_name(),
        parameter: parameter.to_owned(),
    })
}

#[cold]
pub fn not_a_function(method: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAFunction {
        method: method.full_name(),
    })
}

// Resolution Errors

#[cold]
pub fn no_such_method(method: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMethod {
        method: method.full_name(),
    })
}

#[cold]
pub fn no_resolver(capability: Capability) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoResolver { capability })
}

// Reduction Errors

#[cold]
pub fn not_constant(expression: &tess_ir::Expression) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotConstant {
        expression: expression.to_string(),
    })
}

#[cold]
pub fn non_boolean_test(expression: &tess_ir::Expression, found: SqlType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonBooleanTest {
        expression: expression.to_string(),
        found,
    })
}

#[cold]
pub fn not_an_array(expression: &tess_ir::Expression, found: SqlType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnArray {
        expression: expression.to_string(),
        found,
    })
}

#[cold]
pub fn row_out_of_range(row: usize, size: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RowOutOfRange { row, size })
}

#[cold]
pub fn unbound_parameter() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundParameter)
}

#[cold]
pub fn undeclared_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndeclaredVariable {
        name: name.to_owned(),
    })
}

#[cold]
pub fn undefined_reference(name: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedReference {
        name: name.full_name(),
    })
}

#[cold]
pub fn read_only_reference(name: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyReference {
        name: name.full_name(),
    })
}

#[cold]
pub fn depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DepthExceeded { limit })
}

// Authorization Errors

#[cold]
pub fn not_authorized(method: &ObjectName) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAuthorized {
        method: method.full_name(),
    })
}

// Type Compatibility Errors

#[cold]
pub fn incompatible_return(method: &ObjectName, expected: &SqlType, found: SqlType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IncompatibleReturn {
        method: method.full_name(),
        expected: expected.clone(),
        found,
    })
}

#[cold]
pub fn incompatible_output(
    method: &ObjectName,
    parameter: &str,
    expected: &SqlType,
    found: SqlType,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IncompatibleOutput {
        method: method.full_name(),
        parameter: parameter.to_owned(),
        expected: expected.clone(),
        found,
    })
}

#[cold]
pub fn incompatible_assignment(target: &str, expected: &SqlType, found: SqlType) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IncompatibleAssignment {
        target: target.to_owned(),
        expected: expected.clone(),
        found,
    })
}

// Interruption

#[cold]
pub fn cancelled() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Cancelled)
}

#[cold]
pub fn deadline_exceeded() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DeadlineExceeded)
}
