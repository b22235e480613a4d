//! Roll goals: `>=N`, `<=N`, `==N`, `>N`, `<N`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error for goal text that is not `[2d6] <op> <int>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable roll goal `{0}`")]
pub struct GoalParseError(pub String);

/// Comparison operator of a roll goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalOp {
    Ge,
    Le,
    Eq,
    Gt,
    Lt,
}

impl GoalOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Whether `total op target` holds.
    #[must_use]
    pub fn holds(self, total: i64, target: i64) -> bool {
        match self {
            Self::Ge => total >= target,
            Self::Le => total <= target,
            Self::Eq => total == target,
            Self::Gt => total > target,
            Self::Lt => total < target,
        }
    }

    /// Signed movement of the total toward passing, from `before` to `after`.
    ///
    /// Upward goals like higher totals, downward goals like lower totals,
    /// and `==` likes getting closer to the target.
    #[must_use]
    pub fn shift_toward_pass(self, before: i64, after: i64, target: i64) -> i64 {
        match self {
            Self::Ge | Self::Gt => after - before,
            Self::Le | Self::Lt => before - after,
            Self::Eq => (before - target).abs() - (after - target).abs(),
        }
    }
}

/// A parsed roll goal.
///
/// ```
/// use hts_rules::rolls::{Goal, GoalOp};
///
/// let goal: Goal = " 2d6 >= 9 ".parse().unwrap();
/// assert_eq!(goal, Goal::new(GoalOp::Ge, 9));
/// assert!(goal.is_met(9));
/// assert!(!goal.is_met(8));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Goal {
    pub op: GoalOp,
    pub target: i64,
}

impl Goal {
    #[must_use]
    pub const fn new(op: GoalOp, target: i64) -> Self {
        Self { op, target }
    }

    /// Parse `[2d6] <op> <digits>`, ignoring surrounding whitespace.
    pub fn parse(text: &str) -> Result<Self, GoalParseError> {
        let err = || GoalParseError(text.trim().to_string());
        let mut rest = text.trim();
        if rest.get(..3).map_or(false, |prefix| prefix.eq_ignore_ascii_case("2d6")) {
            rest = rest[3..].trim_start();
        }

        let (op, digits) = [
            (">=", GoalOp::Ge),
            ("<=", GoalOp::Le),
            ("==", GoalOp::Eq),
            (">", GoalOp::Gt),
            ("<", GoalOp::Lt),
        ]
        .iter()
        .find_map(|(symbol, op)| rest.strip_prefix(symbol).map(|tail| (*op, tail.trim())))
        .ok_or_else(err)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let target = digits.parse::<i64>().map_err(|_| err())?;
        Ok(Self { op, target })
    }

    #[must_use]
    pub fn is_met(&self, total: i64) -> bool {
        self.op.holds(total, self.target)
    }
}

impl FromStr for Goal {
    type Err = GoalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.target)
    }
}
