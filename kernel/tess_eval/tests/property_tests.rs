//! Property-based tests for reduction.
//!
//! - constants are fixed points of reduction
//! - quantified comparisons agree with a sequential three-valued model
//! - integer addition matches checked `i64` arithmetic

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::needless_pass_by_value,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tess_eval::{ErrorCategory, EvalEnv, Reduce};
use tess_ir::{BinaryOp, Expression, Quantifier};
use tess_value::Value;

// -- Strategies --

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::Unknown),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12..1.0e12_f64).prop_map(Value::Double),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::VarChar),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(2, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::Array)
    })
}

fn relational_strategy() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Equal),
        Just(BinaryOp::NotEqual),
        Just(BinaryOp::Less),
        Just(BinaryOp::LessOrEqual),
        Just(BinaryOp::Greater),
        Just(BinaryOp::GreaterOrEqual),
    ]
}

fn quantifier_strategy() -> impl Strategy<Value = Quantifier> {
    prop_oneof![Just(Quantifier::Any), Just(Quantifier::All)]
}

// -- Reference model --

fn compare(op: BinaryOp, left: i64, right: i64) -> bool {
    match op {
        BinaryOp::Equal => left == right,
        BinaryOp::NotEqual => left != right,
        BinaryOp::Less => left < right,
        BinaryOp::LessOrEqual => left <= right,
        BinaryOp::Greater => left > right,
        BinaryOp::GreaterOrEqual => left >= right,
        other => unreachable!("not relational: {other:?}"),
    }
}

/// Walk the elements in order: the first deciding element or the first
/// unknown one ends the scan.
fn model(quantifier: Quantifier, op: BinaryOp, left: i64, elements: &[Option<i64>]) -> Value {
    let decisive = matches!(quantifier, Quantifier::Any);
    for element in elements {
        match element {
            None => return Value::Unknown,
            Some(right) if compare(op, left, *right) == decisive => {
                return Value::Boolean(decisive);
            }
            Some(_) => {}
        }
    }
    Value::Boolean(!decisive)
}

proptest! {
    #[test]
    fn constants_are_fixed_points(value in value_strategy()) {
        let constant = Expression::constant(value);
        prop_assert_eq!(constant.reduce(&EvalEnv::empty()).unwrap(), constant);
    }

    #[test]
    fn quantify_matches_the_model(
        quantifier in quantifier_strategy(),
        op in relational_strategy(),
        left in -5_i64..5,
        elements in prop::collection::vec(prop::option::weighted(0.85, -5_i64..5), 0..8),
    ) {
        let array = Value::array(
            elements
                .iter()
                .map(|element| element.map_or(Value::Null, Value::Integer)),
        );
        let expr = Expression::quantify(
            quantifier,
            op,
            Expression::constant(left),
            Expression::constant(array),
        )
        .unwrap();

        let reduced = expr.reduce_to_constant(&EvalEnv::empty()).unwrap();
        prop_assert_eq!(reduced, model(quantifier, op, left, &elements));
    }

    #[test]
    fn integer_addition_is_checked(a in any::<i64>(), b in any::<i64>()) {
        let sum = Expression::add(Expression::constant(a), Expression::constant(b));
        let reduced = sum.reduce_to_constant(&EvalEnv::empty());
        match a.checked_add(b) {
            Some(expected) => prop_assert_eq!(reduced.unwrap(), Value::Integer(expected)),
            None => prop_assert_eq!(reduced.unwrap_err().category(), ErrorCategory::Reduction),
        }
    }

    #[test]
    fn addition_commutes(a in -1_000_000_i64..1_000_000, b in -1_000_000_i64..1_000_000) {
        let env = EvalEnv::empty();
        let ab = Expression::add(Expression::constant(a), Expression::constant(b));
        let ba = Expression::add(Expression::constant(b), Expression::constant(a));
        prop_assert_eq!(ab.reduce(&env).unwrap(), ba.reduce(&env).unwrap());
    }
}
