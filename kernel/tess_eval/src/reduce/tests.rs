use super::*;
use crate::errors::{Capability, ErrorCategory, EvalErrorKind};
use crate::memory::{AllowAll, ExecuteGrants, MemoryReferences, MemoryVariables};
use crate::{EvalOptions, Method, MethodContext, MethodInfo, MethodRegistry};
use pretty_assertions::assert_eq;
use tess_ir::{ObjectName, Quantifier};

fn int(n: i64) -> Expression {
    Expression::constant(n)
}

fn array(values: impl IntoIterator<Item = Value>) -> Expression {
    Expression::Constant(Value::array(values))
}

fn reduce(expr: &Expression) -> EvalResult<Value> {
    expr.reduce_to_constant(&EvalEnv::empty())
}

/// A function whose body fails, to prove it was never called.
fn exploding(name: &str) -> Method {
    let info = MethodInfo::function(name, SqlType::Integer).build().unwrap();
    Method::routine(info, |_: &mut MethodContext<'_>| Err(crate::EvalError::new("evaluated")))
}

#[test]
fn test_constant_reduces_to_itself() {
    let expr = Expression::constant("x");
    assert_eq!(expr.reduce(&EvalEnv::empty()).unwrap(), expr);
}

#[test]
fn test_binary_arithmetic() {
    assert_eq!(reduce(&Expression::add(int(2), int(3))), Ok(Value::Integer(5)));
    assert_eq!(
        reduce(&Expression::multiply(Expression::group(Expression::add(int(1), int(2))), int(4))),
        Ok(Value::Integer(12))
    );
}

#[test]
fn test_binary_value_error_is_reduction_error() {
    let err = reduce(&Expression::binary(BinaryOp::Divide, int(1), int(0))).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Value(ValueError::DivisionByZero));
    assert_eq!(err.category(), ErrorCategory::Reduction);
}

#[test]
fn test_unary_and_logic() {
    assert_eq!(reduce(&Expression::negate(int(4))), Ok(Value::Integer(-4)));
    assert_eq!(
        reduce(&Expression::not(Expression::Constant(Value::Unknown))),
        Ok(Value::Unknown)
    );
    assert_eq!(
        reduce(&Expression::and(
            Expression::constant(false),
            Expression::Constant(Value::Unknown)
        )),
        Ok(Value::Boolean(false))
    );
}

#[test]
fn test_cast() {
    assert_eq!(
        reduce(&Expression::cast(Expression::constant("42"), SqlType::Integer)),
        Ok(Value::Integer(42))
    );
    let err = reduce(&Expression::cast(Expression::constant("x"), SqlType::Integer)).unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::Value(ValueError::InvalidCast { .. })
    ));
}

#[test]
fn test_condition_branches() {
    let case = |test| Expression::condition(test, int(1), int(2));
    assert_eq!(reduce(&case(Expression::constant(true))), Ok(Value::Integer(1)));
    assert_eq!(reduce(&case(Expression::constant(false))), Ok(Value::Integer(2)));
    assert_eq!(
        reduce(&case(Expression::equal(int(1), int(1)))),
        Ok(Value::Integer(1))
    );
}

#[test]
fn test_condition_null_test_skips_both_branches() {
    let mut registry = MethodRegistry::new();
    registry.register(exploding("boom"));
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&AllowAll)
        .build();
    let boom = Expression::function(Invoke::new("boom"));

    let unknown = Expression::condition(Expression::Constant(Value::Unknown), boom.clone(), boom.clone());
    assert_eq!(unknown.reduce_to_constant(&env), Ok(Value::Unknown));

    let null = Expression::condition(Expression::null(), boom.clone(), boom);
    assert_eq!(null.reduce_to_constant(&env), Ok(Value::Null));
}

#[test]
fn test_condition_rejects_non_boolean_test() {
    let err = reduce(&Expression::condition(int(1), int(2), int(3))).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NonBooleanTest {
            expression: "1".to_owned(),
            found: SqlType::Integer,
        }
    );
}

#[test]
fn test_condition_checks_untyped_test_after_reduction() {
    let row = MemoryReferences::new().with_typed("flag", SqlType::Any, 7_i64);
    let env = EvalEnv::builder().references(&row).build();
    let expr = Expression::condition(Expression::reference("flag"), int(1), int(2));
    let err = expr.reduce_to_constant(&env).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NonBooleanTest { .. }));
}

fn quantified(quantifier: Quantifier, op: BinaryOp, left: i64, right: Expression) -> Expression {
    Expression::quantify(quantifier, op, int(left), right).unwrap()
}

#[test]
fn test_quantify_empty_array() {
    let empty = || array(Vec::new());
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 1, empty())),
        Ok(Value::Boolean(false))
    );
    assert_eq!(
        reduce(&quantified(Quantifier::All, BinaryOp::Equal, 1, empty())),
        Ok(Value::Boolean(true))
    );
}

#[test]
fn test_quantify_any() {
    let values = || array([Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 2, values())),
        Ok(Value::Boolean(true))
    );
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Greater, 5, values())),
        Ok(Value::Boolean(true))
    );
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 9, values())),
        Ok(Value::Boolean(false))
    );
}

#[test]
fn test_quantify_all() {
    let values = || array([Value::Integer(1), Value::Integer(2)]);
    assert_eq!(
        reduce(&quantified(Quantifier::All, BinaryOp::Greater, 5, values())),
        Ok(Value::Boolean(true))
    );
    assert_eq!(
        reduce(&quantified(Quantifier::All, BinaryOp::Less, 2, values())),
        Ok(Value::Boolean(false))
    );
}

#[test]
fn test_quantify_unknown_element_order() {
    // UNKNOWN before the deciding element wins.
    let null_first = || array([Value::Null, Value::Integer(1)]);
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 1, null_first())),
        Ok(Value::Unknown)
    );
    assert_eq!(
        reduce(&quantified(Quantifier::All, BinaryOp::NotEqual, 1, null_first())),
        Ok(Value::Unknown)
    );

    // The deciding element before UNKNOWN wins.
    let null_last = || array([Value::Integer(1), Value::Null]);
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 1, null_last())),
        Ok(Value::Boolean(true))
    );
    assert_eq!(
        reduce(&quantified(Quantifier::All, BinaryOp::NotEqual, 1, null_last())),
        Ok(Value::Boolean(false))
    );
}

#[test]
fn test_quantify_null_array_and_non_array() {
    assert_eq!(
        reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 1, Expression::null())),
        Ok(Value::Unknown)
    );
    let err = reduce(&quantified(Quantifier::Any, BinaryOp::Equal, 1, int(1))).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotAnArray {
            expression: "1".to_owned(),
            found: SqlType::Integer,
        }
    );
}

#[test]
fn test_quantify_rejects_non_relational_operators() {
    let expr = Expression::Quantify {
        quantifier: Quantifier::All,
        op: BinaryOp::Add,
        left: Box::new(int(1)),
        right: Box::new(array([Value::Integer(1)])),
    };
    let err = reduce(&expr).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Ir(tess_ir::IrError::NotRelational { op: BinaryOp::Add })
    );
    assert_eq!(err.category(), ErrorCategory::Reduction);
}

#[test]
fn test_reference_resolution() {
    let row = MemoryReferences::new().with("t.a", 10_i64);
    let env = EvalEnv::builder().references(&row).build();
    assert_eq!(
        Expression::reference("T.A").reduce_to_constant(&env),
        Ok(Value::Integer(10))
    );
    assert_eq!(
        Expression::reference("t.missing").reduce_to_constant(&env),
        Ok(Value::Unknown)
    );

    let strict = EvalEnv::builder()
        .references(&row)
        .options(EvalOptions::default().case_sensitive())
        .build();
    assert_eq!(
        Expression::reference("T.A").reduce_to_constant(&strict),
        Ok(Value::Unknown)
    );
}

#[test]
fn test_reference_without_resolver() {
    let err = reduce(&Expression::reference("a")).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoResolver {
            capability: Capability::References
        }
    );
    let err = reduce(&Expression::variable("v")).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoResolver {
            capability: Capability::Variables
        }
    );
}

#[test]
fn test_variables_and_assignment() {
    let vars = MemoryVariables::new().declare("total", SqlType::Integer, 1_i64);
    let env = EvalEnv::builder().variables(&vars).build();

    assert_eq!(
        Expression::variable("TOTAL").reduce_to_constant(&env),
        Ok(Value::Integer(1))
    );
    let assign = Expression::assign_variable(
        "total",
        Expression::add(Expression::variable("total"), int(4)),
    );
    assert_eq!(assign.reduce_to_constant(&env), Ok(Value::Integer(5)));
    assert_eq!(vars.get("total").map(|v| v.get()), Some(Value::Integer(5)));
    assert_eq!(
        Expression::variable("nope").reduce_to_constant(&env),
        Ok(Value::Unknown)
    );
}

#[test]
fn test_assigning_an_unresolved_reference_stores_a_typed_null() {
    let vars = MemoryVariables::new().declare("v", SqlType::Integer, 3_i64);
    let row = MemoryReferences::new();
    let env = EvalEnv::builder().references(&row).variables(&vars).build();
    let assign = Expression::assign_variable("v", Expression::reference("missing"));
    assert_eq!(
        assign.reduce_to_constant(&env),
        Ok(Value::TypedNull(SqlType::Integer))
    );
    assert_eq!(
        vars.get("v").map(|v| v.get()),
        Some(Value::TypedNull(SqlType::Integer))
    );
}

#[test]
fn test_assignment_to_undeclared_variable_policy() {
    let vars = MemoryVariables::new();
    let assign = Expression::assign_variable("ghost", int(1));

    let lenient = EvalEnv::builder().variables(&vars).build();
    assert_eq!(assign.reduce_to_constant(&lenient), Ok(Value::Unknown));

    let strict = EvalEnv::builder()
        .variables(&vars)
        .options(
            EvalOptions::default().with_undeclared_assignment(UndeclaredAssignment::Reject),
        )
        .build();
    assert_eq!(
        assign.reduce_to_constant(&strict).unwrap_err().kind,
        EvalErrorKind::UndeclaredVariable {
            name: "ghost".to_owned()
        }
    );
}

#[test]
fn test_reference_assignment() {
    let row = MemoryReferences::new().with_typed("t.c", SqlType::Double, 1.0);
    let env = EvalEnv::builder().references(&row).build();
    let assign = Expression::assign_reference(ObjectName::parse("t.c"), int(3));
    assert_eq!(assign.reduce_to_constant(&env), Ok(Value::Double(3.0)));
    assert_eq!(row.get("t.c"), Some(Value::Double(3.0)));

    let bad = Expression::assign_reference(ObjectName::parse("t.c"), Expression::constant("x"));
    assert!(matches!(
        bad.reduce_to_constant(&env).unwrap_err().kind,
        EvalErrorKind::IncompatibleAssignment { .. }
    ));
    let unknown = Expression::assign_reference(ObjectName::parse("t.nope"), int(1));
    assert_eq!(
        unknown.reduce_to_constant(&env).unwrap_err().kind,
        EvalErrorKind::ReadOnlyReference {
            name: "t.nope".to_owned()
        }
    );
}

#[test]
fn test_parameter_is_never_reducible() {
    assert_eq!(
        reduce(&Expression::parameter()).unwrap_err().kind,
        EvalErrorKind::UnboundParameter
    );
}

#[test]
fn test_function_call() {
    let info = MethodInfo::function("app.double", SqlType::Integer)
        .parameter("n", SqlType::Integer)
        .build()
        .unwrap();
    let mut registry = MethodRegistry::new();
    registry.register(Method::routine(info, |ctx: &mut MethodContext<'_>| {
        let n = ctx.value("n")?;
        ctx.set_result(n.multiply(&Value::Integer(2))?)
    }));
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&AllowAll)
        .build();

    let call = Expression::function(Invoke::positional(
        "APP.DOUBLE",
        [Expression::add(int(1), int(2))],
    ));
    assert_eq!(call.reduce_to_constant(&env), Ok(Value::Integer(6)));
    assert_eq!(call.get_type(&env), Ok(SqlType::Integer));
}

#[test]
fn test_function_not_found() {
    let registry = MethodRegistry::new();
    let env = EvalEnv::builder().methods(&registry).build();
    let err = Expression::function(Invoke::new("nope"))
        .reduce_to_constant(&env)
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoSuchMethod {
            method: "nope".to_owned()
        }
    );
    assert_eq!(err.category(), ErrorCategory::Resolution);
}

#[test]
fn test_function_authorization() {
    let mut registry = MethodRegistry::new();
    registry.register(exploding("secret"));
    let call = Expression::function(Invoke::new("secret"));

    let denied = ExecuteGrants::new().grant("other");
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&denied)
        .build();
    let err = call.reduce_to_constant(&env).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotAuthorized {
            method: "secret".to_owned()
        }
    );

    let granted = ExecuteGrants::new().grant("SECRET");
    let env = EvalEnv::builder()
        .methods(&registry)
        .authorizer(&granted)
        .build();
    let err = call.reduce_to_constant(&env).unwrap_err();
    assert_eq!(err.to_string(), "evaluated");
    assert_eq!(err.notes.len(), 1);
}

#[test]
fn test_system_functions_skip_authorization() {
    let registry = crate::system::registry().unwrap();
    let env = EvalEnv::builder().methods(&registry).build();
    let call = Expression::function(Invoke::positional("upper", [Expression::constant("abc")]));
    assert_eq!(call.reduce_to_constant(&env), Ok(Value::varchar("ABC")));
}

#[test]
fn test_max_depth() {
    let mut expr = int(0);
    for i in 0..10 {
        expr = Expression::add(expr, int(i));
    }
    let env = EvalEnv::builder()
        .options(EvalOptions::default().with_max_depth(5))
        .build();
    assert_eq!(
        expr.reduce_to_constant(&env).unwrap_err().kind,
        EvalErrorKind::DepthExceeded { limit: 5 }
    );
    assert_eq!(reduce(&expr), Ok(Value::Integer(45)));
}

#[test]
fn test_deep_tree_does_not_overflow_the_stack() {
    let mut expr = int(0);
    for _ in 0..5_000 {
        expr = Expression::add(expr, int(1));
    }
    assert_eq!(reduce(&expr), Ok(Value::Integer(5_000)));
}

#[test]
fn test_static_types() {
    let env = EvalEnv::empty();
    assert_eq!(Expression::add(int(1), int(2)).get_type(&env), Ok(SqlType::Integer));
    assert_eq!(
        Expression::add(int(1), Expression::constant(2.5)).get_type(&env),
        Ok(SqlType::Double)
    );
    assert_eq!(
        Expression::binary(BinaryOp::Concat, int(1), int(2)).get_type(&env),
        Ok(SqlType::VarChar)
    );
    assert_eq!(Expression::equal(int(1), int(2)).get_type(&env), Ok(SqlType::Boolean));
    assert_eq!(
        Expression::cast(int(1), SqlType::VarChar).get_type(&env),
        Ok(SqlType::VarChar)
    );
    assert_eq!(
        Expression::condition(Expression::constant(true), Expression::null(), int(1))
            .get_type(&env),
        Ok(SqlType::Integer)
    );
    assert_eq!(Expression::reference("a").get_type(&env), Ok(SqlType::Any));
    assert_eq!(Expression::parameter().get_type(&env), Ok(SqlType::Any));
    assert_eq!(
        Expression::function(Invoke::new("f")).get_type(&env),
        Ok(SqlType::Any)
    );
}

#[test]
fn test_static_types_from_resolvers() {
    let row = MemoryReferences::new().with("name", "bob");
    let vars = MemoryVariables::new().declare("n", SqlType::Double, 0.0);
    let env = EvalEnv::builder().references(&row).variables(&vars).build();
    assert_eq!(Expression::reference("name").get_type(&env), Ok(SqlType::VarChar));
    assert_eq!(Expression::variable("n").get_type(&env), Ok(SqlType::Double));
    assert_eq!(
        Expression::negate(Expression::variable("n")).get_type(&env),
        Ok(SqlType::Double)
    );
}
