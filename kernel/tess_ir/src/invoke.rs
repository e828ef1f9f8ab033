//! Call-site representation of a method invocation.
//!
//! An `Invoke` names a method and carries its arguments without reference to
//! any resolved method. Within one invocation the arguments are either all
//! positional or all named; the check happens as arguments are added. The
//! style is recorded on the invocation itself, so a named call with no
//! arguments stays named.

use std::fmt;

use crate::{Expression, IrError, ObjectName};

/// One argument of an invocation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Argument {
    name: Option<String>,
    value: Expression,
    /// Zero-based position, assigned when the argument is added.
    offset: usize,
}

impl Argument {
    /// Parameter name for named arguments.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Same argument with its value replaced, keeping name and offset.
    pub fn with_value(&self, value: Expression) -> Self {
        Argument {
            name: self.name.clone(),
            value,
            offset: self.offset,
        }
    }
}

/// A method name plus an ordered argument list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Invoke {
    method: ObjectName,
    arguments: Vec<Argument>,
    named: bool,
}

impl Invoke {
    /// Create an invocation with no arguments.
    pub fn new(method: impl Into<ObjectName>) -> Self {
        Invoke {
            method: method.into(),
            arguments: Vec::new(),
            named: false,
        }
    }

    /// Create an invocation with positional arguments.
    pub fn positional(
        method: impl Into<ObjectName>,
        values: impl IntoIterator<Item = Expression>,
    ) -> Self {
        let arguments = values
            .into_iter()
            .enumerate()
            .map(|(offset, value)| Argument {
                name: None,
                value,
                offset,
            })
            .collect();
        Invoke {
            method: method.into(),
            arguments,
            named: false,
        }
    }

    /// Create an invocation with named arguments.
    ///
    /// With no arguments the call is still named, so every parameter falls
    /// back to its default.
    pub fn named<N: Into<String>>(
        method: impl Into<ObjectName>,
        values: impl IntoIterator<Item = (N, Expression)>,
    ) -> Result<Self, IrError> {
        let mut invoke = Invoke::new(method);
        invoke.named = true;
        for (name, value) in values {
            invoke.add_named_argument(name, value)?;
        }
        Ok(invoke)
    }

    /// Append a positional argument.
    pub fn add_argument(&mut self, value: Expression) -> Result<(), IrError> {
        if self.named {
            return Err(IrError::MixedArguments {
                method: self.method.full_name(),
            });
        }
        self.push(None, value);
        Ok(())
    }

    /// Append a named argument.
    ///
    /// Argument names are compared case-insensitively for duplicates.
    pub fn add_named_argument(
        &mut self,
        name: impl Into<String>,
        value: Expression,
    ) -> Result<(), IrError> {
        let name = name.into();
        if !self.named && !self.arguments.is_empty() {
            return Err(IrError::MixedArguments {
                method: self.method.full_name(),
            });
        }
        if self
            .arguments
            .iter()
            .any(|arg| arg.name().is_some_and(|n| n.eq_ignore_ascii_case(&name)))
        {
            return Err(IrError::DuplicateArgument {
                method: self.method.full_name(),
                argument: name,
            });
        }
        self.named = true;
        self.push(Some(name), value);
        Ok(())
    }

    fn push(&mut self, name: Option<String>, value: Expression) {
        let offset = self.arguments.len();
        self.arguments.push(Argument {
            name,
            value,
            offset,
        });
    }

    pub fn method(&self) -> &ObjectName {
        &self.method
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// `true` for named invocations, including a named call with no
    /// arguments. [`Invoke::new`] creates a positional one.
    pub fn is_named(&self) -> bool {
        self.named
    }

    /// Same invocation with every argument value passed through `f`.
    pub fn map_arguments(&self, mut f: impl FnMut(&Expression) -> Expression) -> Self {
        Invoke {
            method: self.method.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|arg| arg.with_value(f(&arg.value)))
                .collect(),
            named: self.named,
        }
    }
}

impl fmt::Display for Invoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::render(|formatter| self.append_to(formatter)))
    }
}
