//! Lexer and recursive-descent parser for the condition language.
//!
//! ## Grammar
//!
//! ```text
//! expr       := or
//! or         := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := primary (("==" | "!=") primary)*
//! primary    := INT | STRING | "true" | "false" | "none" | "null"
//!             | path | path "." "contains" "(" expr ")"
//!             | "(" expr ")"
//! path       := IDENT ("." IDENT)*
//! ```
//!
//! Anything else (ordering operators, arithmetic, `in`, `is`, other calls)
//! is a [`ConditionError`].

use thiserror::Error;

use super::expr::{CompareOp, Expr};
use super::value::Value;

/// Why a condition failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("integer literal out of range at offset {offset}")]
    IntegerOverflow { offset: usize },

    #[error("unsupported operator `{op}` at offset {offset}")]
    UnsupportedOperator { op: String, offset: usize },

    #[error("unsupported call `{name}(...)`")]
    UnsupportedCall { name: String },

    #[error("`.contains` takes exactly one argument, got {count}")]
    ContainsArity { count: usize },

    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    Dot,
    LParen,
    RParen,
    Comma,
    EqEq,
    NotEq,
    /// Any operator the language does not support.
    Op(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Int(i) => format!("integer {i}"),
            Self::Str(s) => format!("string {s:?}"),
            Self::Dot => "`.`".into(),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::Comma => "`,`".into(),
            Self::EqEq => "`==`".into(),
            Self::NotEq => "`!=`".into(),
            Self::Op(op) => format!("`{op}`"),
        }
    }
}

#[derive(Clone, Debug)]
struct Spanned {
    token: Token,
    offset: usize,
}

const KEYWORDS: [&str; 5] = ["and", "or", "not", "in", "is"];

fn lex(src: &str) -> Result<Vec<Spanned>, ConditionError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = if ch.is_alphabetic() || ch == '_' {
            let mut ident = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            Token::Ident(ident)
        } else if ch.is_ascii_digit() || ch == '-' {
            chars.next();
            let negative = ch == '-';
            let mut digits = String::new();
            if !negative {
                digits.push(ch);
            }
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                Token::Op("-".into())
            } else {
                let magnitude: i64 = digits
                    .parse()
                    .map_err(|_| ConditionError::IntegerOverflow { offset })?;
                Token::Int(if negative { -magnitude } else { magnitude })
            }
        } else if ch == '\'' || ch == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                if c == ch {
                    closed = true;
                    break;
                }
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        text.push(escaped);
                    }
                    continue;
                }
                text.push(c);
            }
            if !closed {
                return Err(ConditionError::UnterminatedString { offset });
            }
            Token::Str(text)
        } else {
            chars.next();
            let next_is_eq = matches!(chars.peek(), Some(&(_, '=')));
            match ch {
                '.' => Token::Dot,
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                '=' | '!' | '<' | '>' if next_is_eq => {
                    chars.next();
                    match ch {
                        '=' => Token::EqEq,
                        '!' => Token::NotEq,
                        _ => Token::Op(format!("{ch}=")),
                    }
                }
                '=' | '!' | '<' | '>' | '+' | '*' | '/' | '%' | '&' | '|' | '^' | '~' | '['
                | ']' | '{' | '}' | ':' | '@' => Token::Op(ch.to_string()),
                _ => return Err(ConditionError::UnexpectedChar { ch, offset }),
            }
        };

        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    fn unexpected(&self) -> ConditionError {
        match self.tokens.get(self.pos) {
            None => ConditionError::UnexpectedEnd,
            Some(Spanned {
                token: Token::Op(op),
                offset,
            }) => ConditionError::UnsupportedOperator {
                op: op.clone(),
                offset: *offset,
            },
            Some(Spanned {
                token: Token::Ident(name),
                offset,
            }) if name == "in" || name == "is" => ConditionError::UnsupportedOperator {
                op: name.clone(),
                offset: *offset,
            },
            Some(spanned) => ConditionError::UnexpectedToken {
                found: spanned.token.describe(),
                offset: spanned.offset,
            },
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ConditionError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionError> {
        let mut items = vec![self.parse_and()?];
        while self.at_keyword("or") {
            self.pos += 1;
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionError> {
        let mut items = vec![self.parse_not()?];
        while self.at_keyword("and") {
            self.pos += 1;
            items.push(self.parse_not()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::And(items)
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ConditionError> {
        if self.at_keyword("not") {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ConditionError> {
        let first = self.parse_primary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => CompareOp::Eq,
                Some(Token::NotEq) => CompareOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_primary()?));
        }
        Ok(if rest.is_empty() {
            first
        } else {
            Expr::Compare {
                first: Box::new(first),
                rest,
            }
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ConditionError> {
        let Some(spanned) = self.tokens.get(self.pos).cloned() else {
            return Err(ConditionError::UnexpectedEnd);
        };
        match spanned.token {
            Token::Int(i) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::Int(i)))
            }
            Token::Str(s) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::Text(s)))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if let Some(literal) = keyword_literal(&name) {
                    self.pos += 1;
                    return Ok(Expr::Literal(literal));
                }
                if KEYWORDS.contains(&name.as_str()) {
                    return Err(self.unexpected());
                }
                self.parse_path()
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_path(&mut self) -> Result<Expr, ConditionError> {
        let mut segments = Vec::new();
        match self.advance() {
            Some(Spanned {
                token: Token::Ident(name),
                ..
            }) => segments.push(name),
            _ => return Err(ConditionError::UnexpectedEnd),
        }

        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            let segment = match self.peek() {
                Some(Token::Ident(name)) if !KEYWORDS.contains(&name.as_str()) => name.clone(),
                _ => return Err(self.unexpected()),
            };
            self.pos += 1;

            if segment == "contains" && self.peek() == Some(&Token::LParen) {
                let needle = self.parse_contains_argument()?;
                return Ok(Expr::Contains {
                    container: segments,
                    needle: Box::new(needle),
                });
            }
            segments.push(segment);
        }

        if self.peek() == Some(&Token::LParen) {
            return Err(ConditionError::UnsupportedCall {
                name: segments.join("."),
            });
        }
        Ok(Expr::Path(segments))
    }

    fn parse_contains_argument(&mut self) -> Result<Expr, ConditionError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            args.push(self.parse_or()?);
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                args.push(self.parse_or()?);
            }
        }
        self.expect(&Token::RParen)?;
        if args.len() != 1 {
            return Err(ConditionError::ContainsArity { count: args.len() });
        }
        Ok(args.remove(0))
    }
}

fn keyword_literal(name: &str) -> Option<Value> {
    match name.to_lowercase().as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "none" | "null" => Some(Value::Null),
        _ => None,
    }
}

/// Parse a condition into an expression tree.
pub fn parse(src: &str) -> Result<Expr, ConditionError> {
    let tokens = lex(src)?;
    if tokens.is_empty() {
        return Err(ConditionError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> Expr {
        Expr::Path(text.split('.').map(str::to_string).collect())
    }

    #[test]
    fn test_parse_simple_equality() {
        let expr = parse("challenge_target.type == item").unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                first: Box::new(path("challenge_target.type")),
                rest: vec![(CompareOp::Eq, path("item"))],
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // not binds tighter than and, which binds tighter than or
        let expr = parse("a or not b and c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(vec![
                path("a"),
                Expr::And(vec![Expr::Not(Box::new(path("b"))), path("c")]),
            ])
        );
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("TRUE").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("None").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(parse("-3").unwrap(), Expr::Literal(Value::Int(-3)));
        assert_eq!(parse("'it''s'").unwrap_err(), ConditionError::UnexpectedToken {
            found: "string \"s\"".into(),
            offset: 4,
        });
        assert_eq!(parse(r#""a\"b""#).unwrap(), Expr::Literal(Value::Text("a\"b".into())));
    }

    #[test]
    fn test_parse_contains() {
        let expr = parse("player.classes.contains('Bard')").unwrap();
        assert_eq!(
            expr,
            Expr::Contains {
                container: vec!["player".into(), "classes".into()],
                needle: Box::new(Expr::Literal(Value::Text("Bard".into()))),
            }
        );
    }

    #[test]
    fn test_contains_arity() {
        assert_eq!(
            parse("x.contains()").unwrap_err(),
            ConditionError::ContainsArity { count: 0 }
        );
        assert_eq!(
            parse("x.contains(a, b)").unwrap_err(),
            ConditionError::ContainsArity { count: 2 }
        );
    }

    #[test]
    fn test_rejects_unsupported_operators() {
        assert!(matches!(
            parse("roll.total >= 8").unwrap_err(),
            ConditionError::UnsupportedOperator { ref op, .. } if op == ">="
        ));
        assert!(matches!(
            parse("a < b").unwrap_err(),
            ConditionError::UnsupportedOperator { ref op, .. } if op == "<"
        ));
        assert!(matches!(
            parse("a in b").unwrap_err(),
            ConditionError::UnsupportedOperator { ref op, .. } if op == "in"
        ));
        assert!(matches!(
            parse("a + 1").unwrap_err(),
            ConditionError::UnsupportedOperator { ref op, .. } if op == "+"
        ));
        assert!(matches!(
            parse("a = 1").unwrap_err(),
            ConditionError::UnsupportedOperator { ref op, .. } if op == "="
        ));
    }

    #[test]
    fn test_rejects_calls_and_trailing_tokens() {
        assert_eq!(
            parse("len(hand)").unwrap_err(),
            ConditionError::UnsupportedCall { name: "len".into() }
        );
        assert_eq!(
            parse("hand.count(x)").unwrap_err(),
            ConditionError::UnsupportedCall {
                name: "hand.count".into()
            }
        );
        assert!(matches!(
            parse("a b").unwrap_err(),
            ConditionError::UnexpectedToken { offset: 2, .. }
        ));
        assert_eq!(parse("(a").unwrap_err(), ConditionError::UnexpectedEnd);
        assert_eq!(parse("not").unwrap_err(), ConditionError::UnexpectedEnd);
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(
            parse("'open").unwrap_err(),
            ConditionError::UnterminatedString { offset: 0 }
        );
        assert_eq!(
            parse("a == #").unwrap_err(),
            ConditionError::UnexpectedChar { ch: '#', offset: 5 }
        );
        assert_eq!(parse("   ").unwrap_err(), ConditionError::Empty);
    }
}
