//! End-to-end behavior of the evaluation kernel through its public API.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tess_eval::memory::{AllowAll, MemoryGroup};
use tess_eval::{
    system, ErrorCategory, EvalEnv, EvalErrorKind, GroupResolver, Method, MethodContext,
    MethodInfo, MethodRegistry, Reduce, ReferenceResolver,
};
use tess_ir::{BinaryOp, Expression, Invoke, ObjectName, Quantifier};
use tess_value::{SqlType, Value};

fn int(n: i64) -> Expression {
    Expression::constant(n)
}

fn array(items: impl IntoIterator<Item = Value>) -> Expression {
    Expression::constant(Value::array(items))
}

/// A function that counts its calls.
fn counted(name: &str, calls: &Arc<AtomicUsize>) -> Method {
    let info = MethodInfo::function(name, SqlType::Integer).build().unwrap();
    let calls = Arc::clone(calls);
    Method::routine(info, move |ctx: &mut MethodContext<'_>| {
        calls.fetch_add(1, Ordering::SeqCst);
        ctx.set_result(Value::Integer(1))
    })
}

#[test]
fn test_constants_reduce_to_themselves() {
    let env = EvalEnv::empty();
    for value in [
        Value::Null,
        Value::Unknown,
        Value::Boolean(false),
        Value::Integer(-7),
        Value::Double(0.5),
        Value::varchar("text"),
        Value::array([Value::Integer(1), Value::Null]),
    ] {
        let constant = Expression::constant(value);
        assert_eq!(constant.reduce(&env).unwrap(), constant);
    }
}

#[test]
fn test_addition_reduces_to_a_constant() {
    let env = EvalEnv::empty();
    let sum = Expression::binary(BinaryOp::Add, int(2), int(3));
    assert_eq!(sum.reduce(&env).unwrap(), int(5));
}

#[test]
fn test_quantify_over_an_empty_array() {
    let env = EvalEnv::empty();
    let empty = || array(Vec::new());
    let any = Expression::quantify(Quantifier::Any, BinaryOp::Equal, int(1), empty()).unwrap();
    let all = Expression::quantify(Quantifier::All, BinaryOp::Equal, int(1), empty()).unwrap();
    assert_eq!(any.reduce(&env).unwrap(), Expression::constant(false));
    assert_eq!(all.reduce(&env).unwrap(), Expression::constant(true));
}

#[test]
fn test_unknown_condition_evaluates_neither_branch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MethodRegistry::new();
    registry.register(counted("x", &calls));
    registry.register(counted("y", &calls));
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&AllowAll)
        .build();

    let condition = Expression::condition(
        Expression::constant(Value::Unknown),
        Expression::function(Invoke::new("x")),
        Expression::function(Invoke::new("y")),
    );
    assert_eq!(
        condition.reduce(&env).unwrap(),
        Expression::constant(Value::Unknown)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let taken = Expression::condition(
        Expression::constant(true),
        Expression::function(Invoke::new("x")),
        Expression::function(Invoke::new("y")),
    );
    assert_eq!(taken.reduce(&env).unwrap(), int(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_positional_binding_rejects_extra_arguments() {
    let info = MethodInfo::function("one", SqlType::Any)
        .parameter("a", SqlType::Any)
        .build()
        .unwrap();
    let method = Method::routine(info, |ctx: &mut MethodContext<'_>| {
        let a = ctx.value("a")?;
        ctx.set_result(a)
    });

    let err = method
        .execute(&EvalEnv::empty(), &Invoke::positional("one", [int(1), int(2)]))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Binding);
}

#[test]
fn test_named_binding_applies_defaults() {
    let info = MethodInfo::function("pair", SqlType::VarChar)
        .parameter("a", SqlType::VarChar)
        .optional("b", SqlType::VarChar, Expression::constant("x"))
        .build()
        .unwrap();
    let method = Method::routine(info, |ctx: &mut MethodContext<'_>| {
        let a = ctx.value("a")?;
        let b = ctx.value("b")?;
        ctx.set_result(a.concat(&b)?)
    });

    let invoke = Invoke::named("pair", [("a", Expression::constant("a"))]).unwrap();
    let result = method.execute(&EvalEnv::empty(), &invoke).unwrap();
    assert_eq!(result.into_value(), Value::varchar("ax"));
}

/// A group that records every row it hands out.
struct ObservedGroup {
    inner: MemoryGroup,
    reads: AtomicUsize,
}

impl GroupResolver for ObservedGroup {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn row_resolver(
        &self,
        row: usize,
    ) -> tess_eval::EvalResult<Box<dyn ReferenceResolver + '_>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.row_resolver(row)
    }

    fn resolve_reference(&self, name: &ObjectName, row: usize, ignore_case: bool) -> Option<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_reference(name, row, ignore_case)
    }
}

fn aggregate(group: &dyn GroupResolver, name: &str, argument: Expression) -> Value {
    let registry = system::registry().unwrap();
    let env = EvalEnv::builder().methods(&registry).group(group).build();
    Expression::function(Invoke::positional(name, [argument]))
        .reduce_to_constant(&env)
        .unwrap()
}

#[test]
fn test_count_short_circuits() {
    let empty = MemoryGroup::new(["x"]);
    assert_eq!(
        aggregate(&empty, "COUNT", Expression::reference("x")),
        Value::TypedNull(SqlType::Integer)
    );

    let group = ObservedGroup {
        inner: MemoryGroup::column("x", [1_i64, 2]),
        reads: AtomicUsize::new(0),
    };
    let star = Expression::reference(ObjectName::glob());
    assert_eq!(aggregate(&group, "COUNT", star), Value::Integer(2));
    assert_eq!(group.reads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_aggregates_over_a_column() {
    let group = MemoryGroup::column("v", [2_i64, 45]);
    let v = || Expression::reference("v");
    assert_eq!(aggregate(&group, "SUM", v()), Value::Integer(47));
    assert_eq!(aggregate(&group, "MAX", v()), Value::Integer(45));
    assert_eq!(aggregate(&group, "MIN", v()), Value::Integer(2));
    assert_eq!(aggregate(&group, "AVG", v()), Value::Double(23.5));
}

#[test]
fn test_overloads_resolve_by_signature() {
    let tagged = |param: SqlType, tag: &'static str| {
        let info = MethodInfo::function("f", SqlType::VarChar)
            .parameter("value", param)
            .build()
            .unwrap();
        Method::routine(info, move |ctx: &mut MethodContext<'_>| {
            ctx.set_result(Value::varchar(tag))
        })
    };
    let mut registry = MethodRegistry::new();
    registry.register(tagged(SqlType::Integer, "first"));
    registry.register(tagged(SqlType::VarChar, "second"));
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&AllowAll)
        .build();

    let call = Expression::function(Invoke::positional("f", [Expression::constant("s")]));
    assert_eq!(call.reduce(&env).unwrap(), Expression::constant("second"));
}

#[test]
fn test_functions_cannot_declare_outputs() {
    let err = MethodInfo::function("f", SqlType::Integer)
        .output("o", SqlType::Integer)
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::OutParameterOnFunction { .. }));
    assert_eq!(err.category(), ErrorCategory::Binding);
}

#[test]
fn test_errors_keep_the_failing_call_as_context() {
    let info = MethodInfo::function("boom", SqlType::Integer).build().unwrap();
    let mut registry = MethodRegistry::new();
    registry.register(Method::routine(info, |ctx: &mut MethodContext<'_>| {
        let zero = Value::Integer(0);
        ctx.set_result(Value::Integer(1).divide(&zero)?)
    }));
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&AllowAll)
        .build();

    let err = Expression::function(Invoke::new("boom"))
        .reduce(&env)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Reduction);
    assert!(
        err.notes.iter().any(|note| note.message.contains("boom()")),
        "{:?}",
        err.notes
    );
}
