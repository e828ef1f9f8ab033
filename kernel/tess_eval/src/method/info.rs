//! Static method metadata.

use tess_ir::{Expression, ObjectName};
use tess_value::SqlType;

use crate::errors::{duplicate_parameter, out_parameter_on_function, EvalResult};

/// Direction of a declared parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    #[inline]
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    #[inline]
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// A declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub param_type: SqlType,
    pub direction: Direction,
    /// Substituted when a named invocation omits the parameter.
    pub default: Option<Expression>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: SqlType) -> Self {
        Parameter {
            name: name.into(),
            param_type,
            direction: Direction::In,
            default: None,
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Expression) -> Self {
        self.default = Some(default);
        self
    }

    /// Case-insensitive name comparison.
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Whether a method returns a value or writes outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Function { return_type: SqlType },
    Procedure,
}

/// Immutable description of a method: name, parameters, kind.
///
/// Parameter names are unique ignoring case, and functions have no output
/// parameters. Both are checked by [`MethodInfoBuilder::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    name: ObjectName,
    kind: MethodKind,
    parameters: Vec<Parameter>,
    system: bool,
}

impl MethodInfo {
    /// Start declaring a function returning `return_type`.
    pub fn function(name: impl Into<ObjectName>, return_type: SqlType) -> MethodInfoBuilder {
        MethodInfoBuilder::new(name.into(), MethodKind::Function { return_type })
    }

    /// Start declaring a procedure.
    pub fn procedure(name: impl Into<ObjectName>) -> MethodInfoBuilder {
        MethodInfoBuilder::new(name.into(), MethodKind::Procedure)
    }

    pub fn name(&self) -> &ObjectName {
        &self.name
    }

    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, MethodKind::Function { .. })
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self.kind, MethodKind::Procedure)
    }

    /// Declared return type; `None` for procedures.
    pub fn return_type(&self) -> Option<&SqlType> {
        match &self.kind {
            MethodKind::Function { return_type } => Some(return_type),
            MethodKind::Procedure => None,
        }
    }

    /// System-provided methods skip the execute-privilege check.
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Find a parameter by name, ignoring case.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|param| param.is_named(name))
    }

    /// Parameter types in declaration order.
    pub fn parameter_types(&self) -> impl Iterator<Item = &SqlType> {
        self.parameters.iter().map(|param| &param.param_type)
    }
}

/// Builder for [`MethodInfo`].
#[derive(Clone, Debug)]
pub struct MethodInfoBuilder {
    name: ObjectName,
    kind: MethodKind,
    parameters: Vec<Parameter>,
    system: bool,
}

impl MethodInfoBuilder {
    fn new(name: ObjectName, kind: MethodKind) -> Self {
        MethodInfoBuilder {
            name,
            kind,
            parameters: Vec::new(),
            system: false,
        }
    }

    /// Add an input parameter.
    #[must_use]
    pub fn parameter(self, name: impl Into<String>, param_type: SqlType) -> Self {
        self.with_parameter(Parameter::new(name, param_type))
    }

    /// Add an input parameter with a default value.
    #[must_use]
    pub fn optional(
        self,
        name: impl Into<String>,
        param_type: SqlType,
        default: Expression,
    ) -> Self {
        self.with_parameter(Parameter::new(name, param_type).with_default(default))
    }

    /// Add an output parameter.
    #[must_use]
    pub fn output(self, name: impl Into<String>, param_type: SqlType) -> Self {
        self.with_parameter(Parameter::new(name, param_type).with_direction(Direction::Out))
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Mark the method as system-provided.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }

    pub fn build(self) -> EvalResult<MethodInfo> {
        for (i, param) in self.parameters.iter().enumerate() {
            if self.parameters[..i]
                .iter()
                .any(|earlier| earlier.is_named(&param.name))
            {
                return Err(duplicate_parameter(&self.name, &param.name));
            }
            if param.direction.is_output() && matches!(self.kind, MethodKind::Function { .. }) {
                return Err(out_parameter_on_function(&self.name, &param.name));
            }
        }
        Ok(MethodInfo {
            name: self.name,
            kind: self.kind,
            parameters: self.parameters,
            system: self.system,
        })
    }
}
