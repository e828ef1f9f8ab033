//! Capabilities consumed by the evaluator.
//!
//! Each trait is one seam between the kernel and its host: row storage,
//! procedural variables, method lookup, the current GROUP BY group, and
//! privilege checks. Hosts implement the ones they need and hand them to
//! [`EvalEnvBuilder`](crate::EvalEnvBuilder). In-memory implementations live
//! in [`memory`](crate::memory).
//!
//! Name lookups receive the environment's case policy as `ignore_case`.

use std::sync::Arc;

use tess_ir::{Invoke, ObjectName};
use tess_value::{SqlType, Value};

use crate::errors::{read_only_reference, EvalResult};
use crate::{EvalEnv, Method};

/// Resolves column and object references.
pub trait ReferenceResolver {
    /// Static type of `name`, or `None` if it is unknown.
    fn resolve_type(&self, name: &ObjectName, ignore_case: bool) -> Option<SqlType>;

    /// Current value of `name`, or `None` if it is unknown.
    fn resolve_reference(&self, name: &ObjectName, ignore_case: bool) -> Option<Value>;

    /// Store `value` into `name`, returning the stored value.
    ///
    /// References are read-only unless the resolver overrides this.
    fn assign_reference(
        &self,
        name: &ObjectName,
        value: Value,
        ignore_case: bool,
    ) -> EvalResult<Value> {
        let _ = (value, ignore_case);
        Err(read_only_reference(name))
    }
}

/// A declared procedural variable.
pub trait Variable {
    fn name(&self) -> &str;

    fn var_type(&self) -> SqlType;

    /// Current value of the variable.
    fn evaluate(&self, env: &EvalEnv<'_>) -> EvalResult<Value>;

    /// Assign `value`, returning the value actually stored.
    fn set_value(&self, value: Value, env: &EvalEnv<'_>) -> EvalResult<Value>;
}

/// Resolves procedural variables by name.
pub trait VariableResolver {
    fn resolve_variable(&self, name: &str, ignore_case: bool) -> Option<&dyn Variable>;
}

/// Resolves an invocation to a method.
///
/// `Ok(None)` means no method matched; errors are reserved for lookups that
/// could not be carried out.
pub trait MethodResolver {
    fn resolve_method(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<Option<Arc<Method>>>;
}

/// The row group an aggregate is evaluated over.
pub trait GroupResolver {
    /// Number of rows in the group.
    fn size(&self) -> usize;

    /// A reference resolver bound to row `row` (0-based).
    fn row_resolver(&self, row: usize) -> EvalResult<Box<dyn ReferenceResolver + '_>>;

    /// Value of `name` in row `row`, without building a row resolver.
    fn resolve_reference(&self, name: &ObjectName, row: usize, ignore_case: bool)
        -> Option<Value>;
}

/// Decides whether the caller may execute a method.
pub trait Authorizer {
    fn can_execute(&self, method: &ObjectName) -> bool;
}
