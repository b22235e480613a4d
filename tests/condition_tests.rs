//! Condition language tests.
//!
//! These tests exercise the evaluator the way effect data uses it: dotted
//! paths into card records, protection flags, roll results and
//! `.contains` probes, plus the warning contract for malformed text.

use std::collections::BTreeMap;

use proptest::prelude::*;

use hts_rules::cards::{CardId, CardMeta, CardType};
use hts_rules::conditions::{keys, Condition, ConditionError, ConditionEvaluator, EvalContext, Value};

fn challenge_ctx(card_type: CardType) -> EvalContext {
    let target = CardMeta::new(CardId::new(12), "Decoy Doll", card_type);
    EvalContext::new()
        .with(keys::CHALLENGE_TARGET, target.to_value())
        .with(keys::CHALLENGE_DENIED, false)
}

/// Test that blank and `nan` conditions always hold.
#[test]
fn test_blank_conditions_hold() {
    let mut ctx = EvalContext::new();
    for text in ["", "   ", "\t\n", "nan", " NaN "] {
        assert!(ConditionEvaluator::evaluate(Some(text), &mut ctx), "{text:?}");
    }
    assert!(ConditionEvaluator::evaluate(None, &mut ctx));
    assert!(ctx.warnings().is_empty());
}

/// Test that unquoted identifiers compare against record fields.
#[test]
fn test_card_record_paths() {
    let mut ctx = challenge_ctx(CardType::Item);
    assert!(ConditionEvaluator::evaluate(
        Some("challenge_target.type == item"),
        &mut ctx
    ));
    assert!(ConditionEvaluator::evaluate(
        Some("challenge_target.type != hero and not challenge.denied"),
        &mut ctx
    ));
    assert!(!ConditionEvaluator::evaluate(
        Some("challenge_target.type == 'hero'"),
        &mut ctx
    ));
    // unknown attribute of a known record is null
    assert!(!ConditionEvaluator::evaluate(
        Some("challenge_target.colour"),
        &mut ctx
    ));
    assert!(ctx.warnings().is_empty());
}

/// Test roll results and integer comparisons.
#[test]
fn test_roll_results() {
    let mut ctx = EvalContext::new()
        .with(keys::ROLL_TOTAL, 8i64)
        .with(keys::ROLL_SUCCESS, false);
    assert!(ConditionEvaluator::evaluate(Some("roll.total == 8"), &mut ctx));
    assert!(ConditionEvaluator::evaluate(Some("roll.success == false"), &mut ctx));
    assert!(ConditionEvaluator::evaluate(Some("not roll.success or roll.total == -1"), &mut ctx));
    assert!(!ConditionEvaluator::evaluate(Some("roll.success"), &mut ctx));
}

/// Test `.contains` on maps, lists and text.
#[test]
fn test_contains_variants() {
    let mut classes = BTreeMap::new();
    classes.insert("bard".to_string(), Value::Int(1));
    let mut ctx = EvalContext::new()
        .with("party.classes", Value::Map(classes))
        .with(
            "hand.types",
            Value::List(vec![Value::from("Hero "), Value::from("magic")]),
        )
        .with("note", "draws a card");

    assert!(ConditionEvaluator::evaluate(Some("party.classes.contains('bard')"), &mut ctx));
    assert!(!ConditionEvaluator::evaluate(Some("party.classes.contains(fighter)"), &mut ctx));
    assert!(ConditionEvaluator::evaluate(Some("hand.types.contains('HERO')"), &mut ctx));
    assert!(ConditionEvaluator::evaluate(Some("note.contains(\"draws\")"), &mut ctx));
    assert!(!ConditionEvaluator::evaluate(Some("missing.contains(x)"), &mut ctx));
    assert!(ctx.warnings().is_empty());
}

/// Test that every rejected construct yields false and one warning.
#[test]
fn test_malformed_conditions_warn_once() {
    for text in [
        "roll.total >= 9",
        "roll.total < 3",
        "a in b",
        "a is none",
        "roll.total + 1 == 9",
        "len(hand) == 2",
        "hand.contains(a, b)",
        "a == b c",
        "(a == b",
        "'unterminated",
        "a ==",
    ] {
        let mut ctx = EvalContext::new();
        assert!(!ConditionEvaluator::evaluate(Some(text), &mut ctx), "{text}");
        assert_eq!(ctx.warnings().len(), 1, "{text}");
        assert_eq!(
            ctx.warnings()[0],
            format!("UNPARSEABLE_CONDITION: {}", text.trim())
        );
        assert!(!ConditionEvaluator::is_supported(text), "{text}");
    }
}

/// Test that typed errors name the problem.
#[test]
fn test_typed_parse_errors() {
    assert!(matches!(
        Condition::parse("hand.contains()"),
        Err(ConditionError::ContainsArity { count: 0 })
    ));
    assert!(matches!(
        Condition::parse("count(hand)"),
        Err(ConditionError::UnsupportedCall { .. })
    ));
    assert!(Condition::parse("  ").map(|c| c.is_trivial()).unwrap_or(false));
}

/// Test that the probe never touches a context.
#[test]
fn test_is_supported_probe() {
    assert!(ConditionEvaluator::is_supported("protect.steal"));
    assert!(ConditionEvaluator::is_supported("a == b == c"));
    assert!(ConditionEvaluator::is_supported(""));
    assert!(!ConditionEvaluator::is_supported("a >= 1"));
}

/// Test that a parsed condition can be evaluated repeatedly.
#[test]
fn test_condition_reuse() {
    let condition = Condition::parse("protect.destroy").unwrap();
    let mut ctx = EvalContext::new();
    assert!(!condition.evaluate(&ctx));
    ctx.set_flag(keys::PROTECT_DESTROY, true);
    assert!(condition.evaluate(&ctx));
}

proptest! {
    /// Whitespace-only conditions hold for any context.
    #[test]
    fn prop_whitespace_holds(text in "[ \t\r\n]{0,12}", flag in any::<bool>()) {
        let mut ctx = EvalContext::new().with("flag", flag);
        prop_assert!(ConditionEvaluator::evaluate(Some(&text), &mut ctx));
        prop_assert!(ctx.warnings().is_empty());
    }

    /// Boolean combinations evaluate like the direct Rust expression.
    #[test]
    fn prop_boolean_structure(x in any::<bool>(), y in any::<bool>(), z in any::<bool>()) {
        let mut ctx = EvalContext::new().with("x", x).with("y", y).with("z", z);
        let cases = [
            ("x and y", x && y),
            ("x or y and z", x || (y && z)),
            ("(x or y) and z", (x || y) && z),
            ("not x or not (y and z)", !x || !(y && z)),
            ("not not z", z),
            ("x == y", x == y),
            ("x != z and y", x != z && y),
            ("x == true", x),
        ];
        for (text, expected) in cases {
            prop_assert_eq!(ConditionEvaluator::evaluate(Some(text), &mut ctx), expected, "{}", text);
        }
        prop_assert!(ctx.warnings().is_empty());
    }

    /// Equality against an integer matches the integer comparison.
    #[test]
    fn prop_integer_equality(total in -20i64..20, goal in -20i64..20) {
        let mut ctx = EvalContext::new().with(keys::ROLL_TOTAL, total);
        let text = format!("roll.total == {goal}");
        prop_assert_eq!(ConditionEvaluator::evaluate(Some(&text), &mut ctx), total == goal);
    }
}
