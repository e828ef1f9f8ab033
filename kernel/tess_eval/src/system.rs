//! System-provided methods.
//!
//! Every method here is flagged as a system method and so runs without an
//! execute-privilege check.
//!
//! # Aggregates
//!
//! | name    | parameter | returns   | notes                                    |
//! |---------|-----------|-----------|------------------------------------------|
//! | `COUNT` | `ANY`     | `INTEGER` | `COUNT(*)` answers from the group size   |
//! | `SUM`   | `DOUBLE`  | `DOUBLE`  | skips nulls                              |
//! | `MIN`   | `ANY`     | `ANY`     | skips nulls                              |
//! | `MAX`   | `ANY`     | `ANY`     | skips nulls                              |
//! | `AVG`   | `DOUBLE`  | `DOUBLE`  | sum divided by the group size            |
//!
//! An empty group yields a null of the return type for every aggregate
//! except `COUNT(*)`.
//!
//! # Scalars
//!
//! `ABS(DOUBLE)`, `UPPER(VARCHAR)`, `LOWER(VARCHAR)`, `LENGTH(VARCHAR)`.

use std::cmp::Ordering;

use tess_ir::Expression;
use tess_value::{SqlType, Value, ValueError};

use crate::errors::EvalResult;
use crate::{
    AggregateFunction, GroupResolver, Method, MethodContext, MethodInfo, MethodRegistry, Seed,
};

/// Name of the single parameter of every system method.
const VALUE: &str = "value";

/// All system methods.
pub fn methods() -> EvalResult<Vec<Method>> {
    Ok(vec![
        aggregate("COUNT", SqlType::Any, SqlType::Integer, Count)?,
        aggregate("SUM", SqlType::Double, SqlType::Double, Sum)?,
        aggregate("MIN", SqlType::Any, SqlType::Any, Extreme(Ordering::Less))?,
        aggregate("MAX", SqlType::Any, SqlType::Any, Extreme(Ordering::Greater))?,
        aggregate("AVG", SqlType::Double, SqlType::Double, Avg)?,
        scalar("ABS", SqlType::Double, SqlType::Double, abs)?,
        scalar("UPPER", SqlType::VarChar, SqlType::VarChar, upper)?,
        scalar("LOWER", SqlType::VarChar, SqlType::VarChar, lower)?,
        scalar("LENGTH", SqlType::VarChar, SqlType::Integer, length)?,
    ])
}

/// Register every system method into `registry`.
pub fn register_all(registry: &mut MethodRegistry) -> EvalResult<()> {
    registry.extend(methods()?);
    Ok(())
}

/// A registry holding only the system methods.
pub fn registry() -> EvalResult<MethodRegistry> {
    let mut registry = MethodRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

fn aggregate(
    name: &str,
    param: SqlType,
    returns: SqlType,
    body: impl AggregateFunction + 'static,
) -> EvalResult<Method> {
    let info = MethodInfo::function(name, returns)
        .parameter(VALUE, param)
        .system()
        .build()?;
    Method::aggregate(info, body)
}

fn scalar(
    name: &str,
    param: SqlType,
    returns: SqlType,
    body: fn(&Value) -> Result<Value, ValueError>,
) -> EvalResult<Method> {
    let info = MethodInfo::function(name, returns)
        .parameter(VALUE, param)
        .system()
        .build()?;
    Ok(Method::routine(info, move |ctx: &mut MethodContext<'_>| {
        let value = ctx.value(VALUE)?;
        let result = if value.is_null() {
            Value::Null
        } else {
            body(&value)?
        };
        ctx.set_result(result)
    }))
}

/// `COUNT`: the number of non-null values; `COUNT(*)` counts rows.
struct Count;

impl AggregateFunction for Count {
    fn initialize(&self, group: &dyn GroupResolver, argument: &Expression) -> EvalResult<Seed> {
        if argument.is_glob() {
            let rows = i64::try_from(group.size()).unwrap_or(i64::MAX);
            return Ok(Seed::done(Value::Integer(rows)));
        }
        Ok(Seed::iterate(None))
    }

    fn iterate(&self, accumulated: Option<Value>, value: Value) -> EvalResult<Value> {
        let count = accumulated.and_then(|acc| acc.as_integer()).unwrap_or(0);
        if value.is_null() {
            Ok(Value::Integer(count))
        } else {
            Ok(Value::Integer(count.saturating_add(1)))
        }
    }
}

/// Running sum shared by `SUM` and `AVG`. Nulls are skipped; an all-null
/// group sums to `NULL`.
fn add_skipping_nulls(accumulated: Option<Value>, value: Value) -> EvalResult<Value> {
    match accumulated {
        _ if value.is_null() => Ok(accumulated.unwrap_or(Value::Null)),
        Some(acc) if !acc.is_null() => Ok(acc.add(&value)?),
        _ => Ok(value),
    }
}

/// `SUM`.
struct Sum;

impl AggregateFunction for Sum {
    fn iterate(&self, accumulated: Option<Value>, value: Value) -> EvalResult<Value> {
        add_skipping_nulls(accumulated, value)
    }
}

/// `AVG`: the sum divided by the number of rows in the group.
struct Avg;

impl AggregateFunction for Avg {
    fn iterate(&self, accumulated: Option<Value>, value: Value) -> EvalResult<Value> {
        add_skipping_nulls(accumulated, value)
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "group sizes beyond 2^53 rows are not representable exactly anyway"
    )]
    fn merge(&self, accumulated: Value, group: &dyn GroupResolver) -> EvalResult<Value> {
        if accumulated.is_null() {
            return Ok(Value::Null);
        }
        Ok(accumulated.divide(&Value::Double(group.size() as f64))?)
    }
}

/// `MIN` (`Less`) and `MAX` (`Greater`): keeps the value that orders
/// `wanted` against the current extreme.
struct Extreme(Ordering);

impl AggregateFunction for Extreme {
    fn iterate(&self, accumulated: Option<Value>, value: Value) -> EvalResult<Value> {
        match accumulated {
            _ if value.is_null() => Ok(accumulated.unwrap_or(Value::Null)),
            Some(current) if !current.is_null() => {
                if value.compare(&current)? == Some(self.0) {
                    Ok(value)
                } else {
                    Ok(current)
                }
            }
            _ => Ok(value),
        }
    }
}

fn abs(value: &Value) -> Result<Value, ValueError> {
    match value {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .ok_or(ValueError::Overflow {
                operation: "absolute value",
            }),
        Value::Double(x) => Ok(Value::Double(x.abs())),
        other => Err(ValueError::UnaryTypeMismatch {
            op: "ABS",
            operand: other.sql_type(),
        }),
    }
}

fn upper(value: &Value) -> Result<Value, ValueError> {
    Ok(Value::VarChar(value.to_text().to_uppercase()))
}

fn lower(value: &Value) -> Result<Value, ValueError> {
    Ok(Value::VarChar(value.to_text().to_lowercase()))
}

fn length(value: &Value) -> Result<Value, ValueError> {
    let chars = value.to_text().chars().count();
    Ok(Value::Integer(i64::try_from(chars).unwrap_or(i64::MAX)))
}
