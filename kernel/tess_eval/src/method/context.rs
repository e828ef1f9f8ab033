//! Per-invocation method state and argument binding.

use rustc_hash::FxHashMap;
use tess_ir::{Expression, Invoke};
use tess_value::Value;

use super::{validate_return, MethodInfo, MethodResult};
use crate::errors::{
    argument_count_mismatch, incompatible_output, missing_parameter, not_a_function,
    not_a_procedure, not_an_output, unknown_parameter, EvalResult,
};
use crate::{EvalEnv, Reduce};

/// State of one method execution.
///
/// Holds the parameter bindings, the function result and the procedure
/// outputs. Argument expressions are reduced lazily, when the body asks for
/// them through [`MethodContext::value`].
pub struct MethodContext<'a> {
    info: &'a MethodInfo,
    env: &'a EvalEnv<'a>,
    /// Lowercased parameter name to bound expression.
    bindings: FxHashMap<String, &'a Expression>,
    result: Option<Value>,
    outputs: Vec<(String, Value)>,
}

impl<'a> MethodContext<'a> {
    /// Bind `invoke` to the parameters of `info`.
    pub fn bind(info: &'a MethodInfo, env: &'a EvalEnv<'a>, invoke: &'a Invoke) -> EvalResult<Self> {
        Ok(MethodContext {
            info,
            env,
            bindings: bind_arguments(info, invoke)?,
            result: None,
            outputs: Vec::new(),
        })
    }

    pub fn info(&self) -> &MethodInfo {
        self.info
    }

    /// The environment the method was invoked in.
    pub fn env(&self) -> &'a EvalEnv<'a> {
        self.env
    }

    /// The expression bound to `name`, unreduced.
    pub fn argument(&self, name: &str) -> Option<&'a Expression> {
        self.bindings.get(&name.to_ascii_lowercase()).copied()
    }

    /// Reduce the argument bound to `name` to a value.
    pub fn value(&self, name: &str) -> EvalResult<Value> {
        let expr = self
            .argument(name)
            .ok_or_else(|| unknown_parameter(self.info.name(), name))?;
        expr.reduce_to_constant(self.env)
    }

    /// Set the function result. Setting it again replaces the earlier value.
    pub fn set_result(&mut self, value: Value) -> EvalResult<()> {
        if !self.info.is_function() {
            return Err(not_a_function(self.info.name()));
        }
        self.result = Some(value);
        Ok(())
    }

    /// Write an output parameter of a procedure.
    pub fn set_output(&mut self, name: &str, value: Value) -> EvalResult<()> {
        let method = self.info.name();
        if !self.info.is_procedure() {
            return Err(not_a_procedure(method));
        }
        let param = self
            .info
            .parameter(name)
            .ok_or_else(|| unknown_parameter(method, name))?;
        if !param.direction.is_output() {
            return Err(not_an_output(method, &param.name));
        }
        if !value.is_assignable_to(&param.param_type) {
            let found = value.sql_type();
            return Err(incompatible_output(method, &param.name, &param.param_type, found));
        }
        let value = if value.is_null() {
            value.cast_to(&param.param_type)?
        } else {
            value
        };

        match self
            .outputs
            .iter_mut()
            .find(|(existing, _)| existing == &param.name)
        {
            Some((_, slot)) => *slot = value,
            None => self.outputs.push((param.name.clone(), value)),
        }
        Ok(())
    }

    /// Finish the execution, validating the result against the declaration.
    pub fn into_result(self) -> EvalResult<MethodResult> {
        let value = validate_return(self.info, self.result.unwrap_or(Value::Null))?;
        Ok(MethodResult {
            value,
            outputs: self.outputs,
        })
    }
}

/// Map every parameter of `info` to the expression `invoke` supplies for it.
///
/// Positional invocations must supply exactly one argument per parameter.
/// Named invocations may omit parameters that have a default, and
/// output-only parameters, which take no input.
pub(crate) fn bind_arguments<'a>(
    info: &'a MethodInfo,
    invoke: &'a Invoke,
) -> EvalResult<FxHashMap<String, &'a Expression>> {
    let params = info.parameters();
    let mut bindings = FxHashMap::default();

    if !invoke.is_named() {
        if invoke.argument_count() != params.len() {
            return Err(argument_count_mismatch(
                info.name(),
                params.len(),
                invoke.argument_count(),
            ));
        }
        for (param, argument) in params.iter().zip(invoke.arguments()) {
            bindings.insert(param.name.to_ascii_lowercase(), argument.value());
        }
        return Ok(bindings);
    }

    for argument in invoke.arguments() {
        let name = argument.name().unwrap_or_default();
        let param = info
            .parameter(name)
            .ok_or_else(|| unknown_parameter(info.name(), name))?;
        bindings.insert(param.name.to_ascii_lowercase(), argument.value());
    }
    for param in params {
        let key = param.name.to_ascii_lowercase();
        if bindings.contains_key(&key) {
            continue;
        }
        match &param.default {
            Some(default) => {
                bindings.insert(key, default);
            }
            None if !param.direction.is_input() => {}
            None => return Err(missing_parameter(info.name(), &param.name)),
        }
    }
    Ok(bindings)
}
