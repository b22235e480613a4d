//! Parsed conditions and the evaluator entry points.
//!
//! Card data gates steps with short boolean expressions such as
//! `challenge_target.type == item and not protect.challenge`. A blank
//! (or spreadsheet `nan`) condition always holds. A condition that fails
//! to parse never holds and leaves one warning in the context.

use super::context::EvalContext;
use super::expr::Expr;
use super::parser::{parse, ConditionError};
use crate::cards::records::is_blank;

/// A condition parsed once and evaluable many times.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    source: String,
    /// `None` for a blank condition.
    expr: Option<Expr>,
}

impl Condition {
    /// Parse a condition. Blank text parses to the always-true condition.
    pub fn parse(text: &str) -> Result<Self, ConditionError> {
        let source = text.trim().to_string();
        if is_blank(&source) {
            return Ok(Self { source, expr: None });
        }
        let expr = parse(&source)?;
        Ok(Self {
            source,
            expr: Some(expr),
        })
    }

    /// The trimmed source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this is the always-true blank condition.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.expr.is_none()
    }

    #[must_use]
    pub fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    /// Evaluate to a boolean by truthiness.
    #[must_use]
    pub fn evaluate(&self, ctx: &EvalContext) -> bool {
        self.expr.as_ref().map_or(true, |expr| expr.eval(ctx).truthy())
    }
}

/// Evaluates condition text found on effect steps.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate optional condition text against a context.
    ///
    /// Absent or blank text is true. Unparseable text is false and records
    /// `UNPARSEABLE_CONDITION: <text>` in the context.
    pub fn evaluate(text: Option<&str>, ctx: &mut EvalContext) -> bool {
        let Some(text) = text else {
            return true;
        };
        match Condition::parse(text) {
            Ok(condition) => condition.evaluate(ctx),
            Err(err) => {
                tracing::debug!(condition = text.trim(), error = %err, "condition rejected");
                ctx.warn(format!("UNPARSEABLE_CONDITION: {}", text.trim()));
                false
            }
        }
    }

    /// Whether `text` is accepted by the parser. Touches nothing.
    #[must_use]
    pub fn is_supported(text: &str) -> bool {
        Condition::parse(text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Value;

    #[test]
    fn test_blank_is_true() {
        let mut ctx = EvalContext::new();
        assert!(ConditionEvaluator::evaluate(None, &mut ctx));
        assert!(ConditionEvaluator::evaluate(Some("   "), &mut ctx));
        assert!(ConditionEvaluator::evaluate(Some("NaN"), &mut ctx));
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_unparseable_warns_once() {
        let mut ctx = EvalContext::new();
        assert!(!ConditionEvaluator::evaluate(Some(" roll.total >= 8 "), &mut ctx));
        assert_eq!(ctx.warnings(), &["UNPARSEABLE_CONDITION: roll.total >= 8"]);
    }

    #[test]
    fn test_is_supported() {
        assert!(ConditionEvaluator::is_supported("a.b == c"));
        assert!(ConditionEvaluator::is_supported(""));
        assert!(!ConditionEvaluator::is_supported("a > b"));
    }

    #[test]
    fn test_condition_reusable() {
        let condition = Condition::parse("attack.success").unwrap();
        assert!(!condition.is_trivial());
        assert_eq!(condition.source(), "attack.success");

        let hit = EvalContext::new().with("attack.success", Value::Bool(true));
        let miss = EvalContext::new().with("attack.success", Value::Bool(false));
        assert!(condition.evaluate(&hit));
        assert!(!condition.evaluate(&miss));
    }
}
