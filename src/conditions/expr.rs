//! Expression tree for parsed conditions.

use super::context::EvalContext;
use super::value::Value;

/// Equality operator in a comparison chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
}

/// A parsed condition expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Dotted attribute path, e.g. `challenge_target.type`.
    Path(Vec<String>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// `first op1 e1 op2 e2 ...`, true when every adjacent pair holds.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
    /// `path.contains(needle)`.
    Contains {
        container: Vec<String>,
        needle: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate against a context. Never fails; missing data is null.
    #[must_use]
    pub fn eval(&self, ctx: &EvalContext) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Path(path) => ctx.resolve(path),
            Self::Not(inner) => Value::Bool(!inner.eval(ctx).truthy()),
            Self::And(items) => Value::Bool(items.iter().all(|e| e.eval(ctx).truthy())),
            Self::Or(items) => Value::Bool(items.iter().any(|e| e.eval(ctx).truthy())),
            Self::Compare { first, rest } => {
                let mut left = first.eval(ctx);
                for (op, expr) in rest {
                    let right = expr.eval(ctx);
                    let equal = left.loose_eq(&right);
                    let holds = match op {
                        CompareOp::Eq => equal,
                        CompareOp::NotEq => !equal,
                    };
                    if !holds {
                        return Value::Bool(false);
                    }
                    left = right;
                }
                Value::Bool(true)
            }
            Self::Contains { container, needle } => {
                let haystack = ctx.resolve(container);
                Value::Bool(contains(&haystack, &needle.eval(ctx)))
            }
        }
    }
}

fn normalize(value: &Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(s.trim().to_lowercase()),
        other => other.clone(),
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    let needle = normalize(needle);
    match haystack {
        Value::Map(fields) => match &needle {
            Value::Text(key) => fields.contains_key(key),
            Value::Int(i) => fields.contains_key(&i.to_string()),
            _ => false,
        },
        Value::List(items) => items.iter().any(|item| normalize(item).loose_eq(&needle)),
        Value::Text(text) => text.contains(needle.display_text().as_str()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> Expr {
        Expr::Path(text.split('.').map(str::to_string).collect())
    }

    #[test]
    fn test_chain_requires_every_pair() {
        let ctx = EvalContext::new().with("a", 1i64).with("b", 1i64).with("c", 2i64);
        let chain = Expr::Compare {
            first: Box::new(path("a")),
            rest: vec![(CompareOp::Eq, path("b")), (CompareOp::Eq, path("c"))],
        };
        assert_eq!(chain.eval(&ctx), Value::Bool(false));

        let mixed = Expr::Compare {
            first: Box::new(path("a")),
            rest: vec![(CompareOp::Eq, path("b")), (CompareOp::NotEq, path("c"))],
        };
        assert_eq!(mixed.eval(&ctx), Value::Bool(true));
    }

    #[test]
    fn test_contains_list_normalizes() {
        let ctx = EvalContext::new().with(
            "classes",
            Value::List(vec![Value::from(" Bard "), Value::from("Fighter")]),
        );
        let expr = Expr::Contains {
            container: vec!["classes".into()],
            needle: Box::new(Expr::Literal(Value::from("BARD"))),
        };
        assert_eq!(expr.eval(&ctx), Value::Bool(true));
    }

    #[test]
    fn test_contains_on_null_is_false() {
        let ctx = EvalContext::new();
        let expr = Expr::Contains {
            container: vec!["missing".into(), "field".into()],
            needle: Box::new(Expr::Literal(Value::from("x"))),
        };
        assert_eq!(expr.eval(&ctx), Value::Bool(false));
    }
}
