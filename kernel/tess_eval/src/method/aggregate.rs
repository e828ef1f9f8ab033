//! The aggregate accumulation protocol.
//!
//! An aggregate runs once per GROUP BY group in three phases:
//!
//! 1. **Seed** ([`AggregateFunction::initialize`]): sees the group and the raw
//!    argument expression, and may finish the aggregation without visiting a
//!    row (`COUNT(*)`).
//! 2. **Iterate** ([`AggregateFunction::iterate`]): called once per row, in
//!    row order, with the running accumulation and the row's argument value.
//! 3. **Merge** ([`AggregateFunction::merge`]): a final transform of the
//!    accumulation (`AVG` divides by the group size).
//!
//! A bare column argument is read straight from the group for each row. Any
//! other argument is reduced per row in an environment whose references are
//! bound to that row.

use tess_ir::{Expression, Invoke};
use tess_value::Value;

use super::context::bind_arguments;
use super::MethodInfo;
use crate::errors::{invalid_aggregate, EvalResult};
use crate::{EvalEnv, GroupResolver, Reduce};

/// Outcome of the seed phase.
#[derive(Clone, Debug, PartialEq)]
pub struct Seed {
    /// Initial accumulation, or the final result when `iterate` is false.
    pub value: Option<Value>,
    /// Whether the rows of the group should be visited.
    pub iterate: bool,
}

impl Seed {
    /// Visit every row, starting from `initial`.
    pub fn iterate(initial: Option<Value>) -> Self {
        Seed {
            value: initial,
            iterate: true,
        }
    }

    /// Skip iteration and merge; `value` is the aggregate's result.
    pub fn done(value: Value) -> Self {
        Seed {
            value: Some(value),
            iterate: false,
        }
    }
}

/// An aggregate function body.
pub trait AggregateFunction: Send + Sync {
    /// Seed phase. The default visits every row with no initial value.
    fn initialize(&self, group: &dyn GroupResolver, argument: &Expression) -> EvalResult<Seed> {
        let _ = (group, argument);
        Ok(Seed::iterate(None))
    }

    /// Fold one row into the accumulation.
    ///
    /// `accumulated` is `None` on the first row unless the seed supplied a
    /// value.
    fn iterate(&self, accumulated: Option<Value>, value: Value) -> EvalResult<Value>;

    /// Final transform of the accumulated value. Identity by default.
    fn merge(&self, accumulated: Value, group: &dyn GroupResolver) -> EvalResult<Value> {
        let _ = group;
        Ok(accumulated)
    }
}

/// Run `aggregate` over the current group of `env`.
#[tracing::instrument(level = "debug", skip_all, fields(method = %info.name()))]
pub(super) fn accumulate(
    info: &MethodInfo,
    aggregate: &dyn AggregateFunction,
    env: &EvalEnv<'_>,
    invoke: &Invoke,
) -> EvalResult<Value> {
    let group = env.require_group()?;
    let bindings = bind_arguments(info, invoke)?;
    let argument = info
        .parameters()
        .first()
        .and_then(|param| bindings.get(&param.name.to_ascii_lowercase()).copied())
        .ok_or_else(|| invalid_aggregate(info.name()))?;

    let seed = aggregate.initialize(group, argument)?;
    if !seed.iterate {
        tracing::trace!("seed phase finished the aggregation");
        return Ok(seed.value.unwrap_or(Value::Null));
    }

    let size = group.size();
    if size == 0 {
        return Ok(Value::Null);
    }

    let mut accumulated = seed.value;
    match argument {
        Expression::Reference(name) => {
            tracing::trace!(%name, size, "aggregating column directly");
            for row in 0..size {
                env.checkpoint()?;
                let value = group
                    .resolve_reference(name, row, env.ignore_case())
                    .unwrap_or(Value::Unknown);
                accumulated = Some(aggregate.iterate(accumulated, value)?);
            }
        }
        expr => {
            tracing::trace!(size, "aggregating expression per row");
            for row in 0..size {
                env.checkpoint()?;
                let resolver = group.row_resolver(row)?;
                let row_env = env.for_row(resolver.as_ref());
                let value = expr.reduce_to_constant(&row_env)?;
                accumulated = Some(aggregate.iterate(accumulated, value)?);
            }
        }
    }

    aggregate.merge(accumulated.unwrap_or(Value::Null), group)
}
