//! Dynamic values seen by the condition language.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value in an evaluation context.
///
/// Comparison is loose in the way the condition language needs: booleans
/// compare equal to the integers 0 and 1, and lists and maps compare
/// structurally.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness: null, `false`, `0`, `""` and empty collections are false.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(fields) => !fields.is_empty(),
        }
    }

    /// Equality used by `==` and `!=`.
    #[must_use]
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Int(b)) | (Self::Int(b), Self::Bool(a)) => i64::from(*a) == *b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            _ => self == other,
        }
    }

    /// Field of a map value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Map(fields) => fields.get(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The text form used when a value is searched for inside a string.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => "none".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(_) | Self::Map(_) => String::new(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self::Map(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Text(String::new()).truthy());
        assert!(!Value::List(vec![]).truthy());
        assert!(Value::Int(-1).truthy());
        assert!(Value::from("x").truthy());
    }

    #[test]
    fn test_loose_eq_bool_int() {
        assert!(Value::Bool(true).loose_eq(&Value::Int(1)));
        assert!(Value::Int(0).loose_eq(&Value::Bool(false)));
        assert!(!Value::Int(2).loose_eq(&Value::Bool(true)));
        assert!(!Value::from("1").loose_eq(&Value::Int(1)));
    }

    #[test]
    fn test_loose_eq_nested() {
        let a = Value::List(vec![Value::Bool(true), Value::from("a")]);
        let b = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert!(a.loose_eq(&b));
    }
}
