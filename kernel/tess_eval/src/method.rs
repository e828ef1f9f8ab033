//! Executable methods.
//!
//! A [`Method`] pairs immutable [`MethodInfo`] metadata with a body. Scalar
//! functions and procedures share one body shape, a routine that reads its
//! arguments from a [`MethodContext`] and writes a result or outputs back.
//! Aggregates implement [`AggregateFunction`] instead and run once per group.

mod aggregate;
mod context;
mod info;

use std::fmt;
use std::sync::Arc;

use tess_ir::{Invoke, ObjectName};
use tess_value::Value;

use crate::errors::{incompatible_return, invalid_aggregate, EvalResult};
use crate::EvalEnv;

pub use aggregate::{AggregateFunction, Seed};
pub use context::MethodContext;
pub use info::{Direction, MethodInfo, MethodInfoBuilder, MethodKind, Parameter};

/// Body of a scalar function or procedure.
pub type RoutineFn = dyn Fn(&mut MethodContext<'_>) -> EvalResult<()> + Send + Sync;

#[derive(Clone)]
enum Body {
    Routine(Arc<RoutineFn>),
    Aggregate(Arc<dyn AggregateFunction>),
}

/// A declared method together with its implementation.
#[derive(Clone)]
pub struct Method {
    info: MethodInfo,
    body: Body,
}

impl Method {
    /// Create a scalar function or procedure from a routine.
    ///
    /// Functions report their value through [`MethodContext::set_result`];
    /// procedures through [`MethodContext::set_output`].
    pub fn routine<F>(info: MethodInfo, body: F) -> Self
    where
        F: Fn(&mut MethodContext<'_>) -> EvalResult<()> + Send + Sync + 'static,
    {
        Method {
            info,
            body: Body::Routine(Arc::new(body)),
        }
    }

    /// Create an aggregate function.
    ///
    /// Aggregates are functions of exactly one input parameter.
    pub fn aggregate(info: MethodInfo, aggregate: impl AggregateFunction + 'static) -> EvalResult<Self> {
        let single_input = matches!(info.parameters(), [param] if param.direction.is_input());
        if !info.is_function() || !single_input {
            return Err(invalid_aggregate(info.name()));
        }
        Ok(Method {
            info,
            body: Body::Aggregate(Arc::new(aggregate)),
        })
    }

    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    pub fn name(&self) -> &ObjectName {
        self.info.name()
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.body, Body::Aggregate(_))
    }

    /// Bind `invoke` to this method's parameters and run the body.
    ///
    /// The per-invocation context lives only for the duration of this call
    /// and is dropped on every exit path.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %self.info.name()))]
    pub fn execute(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<MethodResult> {
        env.checkpoint()?;
        match &self.body {
            Body::Routine(routine) => {
                let mut context = MethodContext::bind(&self.info, env, invoke)?;
                routine(&mut context)?;
                context.into_result()
            }
            Body::Aggregate(aggregate) => {
                let value = aggregate::accumulate(&self.info, aggregate.as_ref(), env, invoke)?;
                Ok(MethodResult {
                    value: validate_return(&self.info, value)?,
                    outputs: Vec::new(),
                })
            }
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("info", &self.info)
            .field("aggregate", &self.is_aggregate())
            .finish()
    }
}

/// Check a function's value against its declared return type.
///
/// A null result takes on the declared type. Procedures always produce `NULL`.
pub(crate) fn validate_return(info: &MethodInfo, value: Value) -> EvalResult<Value> {
    match info.return_type() {
        Some(expected) if value.is_null() => Ok(value.cast_to(expected)?),
        Some(expected) => {
            if value.is_assignable_to(expected) {
                Ok(value)
            } else {
                Err(incompatible_return(info.name(), expected, value.sql_type()))
            }
        }
        None => Ok(Value::Null),
    }
}

/// Outcome of one method execution.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodResult {
    value: Value,
    outputs: Vec<(String, Value)>,
}

impl MethodResult {
    /// Return value of a function; `NULL` for procedures and unset results.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Output value of a procedure parameter, matched ignoring case.
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|(param, _)| param.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Outputs in the order they were first set.
    pub fn outputs(&self) -> &[(String, Value)] {
        &self.outputs
    }
}
