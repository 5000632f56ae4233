//! Unit expression parsing - evaluate expressions like "4 kWh / mile"
//!
//! Supported syntax:
//! - Names: "meter", "kWh"
//! - Numbers: "4", "-2", "0.5", "1e3" (dimensionless quantities)
//! - Products: "kW*hour", "kW hour" (adjacency multiplies)
//! - Quotients: "GBP / watt_hour"
//! - Grouping: "(kelvin/watt)*hour"
//!
//! `*` and `/` share one precedence level and associate left to right.

use crate::{Quantity, Registry, Resolved};
use metron_core::UnitError;
use std::fmt;
use tracing::trace;

/// A lexical token of a unit expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Multiply,
    Divide,
    Open,
    Close,
    Operand(Resolved),
}

impl Token {
    fn ends_operand(&self) -> bool {
        matches!(self, Token::Operand(_) | Token::Close)
    }

    fn starts_operand(&self) -> bool {
        matches!(self, Token::Operand(_) | Token::Open)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Multiply => write!(f, "*"),
            Token::Divide => write!(f, "/"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Operand(value) => write!(f, "{}", value),
        }
    }
}

/// Evaluate `expr` against the units of `registry`
pub fn evaluate(registry: &Registry, expr: &str) -> Result<Resolved, UnitError> {
    let tokens = insert_implicit_multiplication(tokenize(registry, expr)?);
    let postfix = to_postfix(tokens, expr)?;
    let value = evaluate_postfix(registry, postfix, expr)?;
    trace!(expression = expr, result = %value, "evaluated unit expression");
    Ok(value)
}

/// Split `expr` into tokens, resolving names and numbers as it goes
pub fn tokenize(registry: &Registry, expr: &str) -> Result<Vec<Token>, UnitError> {
    let mut padded = String::with_capacity(expr.len() * 2);
    for c in expr.chars() {
        match c {
            '*' | '/' | '(' | ')' => {
                padded.push(' ');
                padded.push(c);
                padded.push(' ');
            }
            _ => padded.push(c),
        }
    }

    padded
        .split_whitespace()
        .map(|word| classify(registry, word))
        .collect()
}

fn classify(registry: &Registry, word: &str) -> Result<Token, UnitError> {
    let token = match word {
        "*" => Token::Multiply,
        "/" => Token::Divide,
        "(" => Token::Open,
        ")" => Token::Close,
        _ => {
            // names resolve directly, never back through the parser
            if let Some(unit) = registry.lookup(word) {
                Token::Operand(Resolved::Unit(unit.clone()))
            } else if let Some(value) = parse_number(word) {
                Token::Operand(Resolved::Quantity(Quantity::new(value, registry.dimensionless())))
            } else {
                return Err(UnitError::unknown_unit(word));
            }
        }
    };
    Ok(token)
}

/// Numeric literal: all digits (optionally negated) parse as an integer,
/// anything else as a float
fn parse_number(word: &str) -> Option<f64> {
    let digits = word.strip_prefix('-').unwrap_or(word);
    let value = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        word.parse::<i64>()
            .map(|n| n as f64)
            .or_else(|_| word.parse::<f64>())
            .ok()
    } else {
        word.parse::<f64>().ok()
    };
    value.filter(|v| v.is_finite())
}

/// Insert `*` wherever an operand or `)` is directly followed by an
/// operand or `(`
pub fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() * 2);
    for token in tokens {
        let adjacent = out.last().map_or(false, Token::ends_operand) && token.starts_operand();
        if adjacent {
            out.push(Token::Multiply);
        }
        out.push(token);
    }
    out
}

/// Shunting-yard conversion from infix to postfix order
pub fn to_postfix(tokens: Vec<Token>, expr: &str) -> Result<Vec<Token>, UnitError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Operand(_) => output.push(token),
            Token::Multiply | Token::Divide => {
                while let Some(top) = operators.pop() {
                    if matches!(top, Token::Open) {
                        operators.push(top);
                        break;
                    }
                    output.push(top);
                }
                operators.push(token);
            }
            Token::Open => operators.push(token),
            Token::Close => loop {
                match operators.pop() {
                    Some(Token::Open) => break,
                    Some(op) => output.push(op),
                    None => {
                        return Err(UnitError::malformed(format!(
                            "unmatched ')' in '{}'",
                            expr
                        )))
                    }
                }
            },
        }
    }

    while let Some(op) = operators.pop() {
        if matches!(op, Token::Open) {
            return Err(UnitError::malformed(format!("unmatched '(' in '{}'", expr)));
        }
        output.push(op);
    }
    Ok(output)
}

/// Evaluate a postfix token sequence; an empty one is dimensionless
pub fn evaluate_postfix(registry: &Registry, postfix: Vec<Token>, expr: &str) -> Result<Resolved, UnitError> {
    let mut stack: Vec<Resolved> = Vec::new();

    for token in postfix {
        match token {
            Token::Operand(value) => stack.push(value),
            Token::Multiply | Token::Divide => {
                let (rhs, lhs) = match (stack.pop(), stack.pop()) {
                    (Some(rhs), Some(lhs)) => (rhs, lhs),
                    _ => {
                        return Err(UnitError::malformed(format!(
                            "'{}' is missing an operand in '{}'",
                            token, expr
                        )))
                    }
                };
                let value = if token == Token::Multiply {
                    lhs.multiply(&rhs)?
                } else {
                    lhs.divide(&rhs)?
                };
                stack.push(value);
            }
            Token::Open | Token::Close => {
                return Err(UnitError::malformed(format!(
                    "unexpected '{}' in '{}'",
                    token, expr
                )))
            }
        }
    }

    match stack.len() {
        0 => Ok(Resolved::Unit(registry.dimensionless())),
        1 => Ok(stack.remove(0)),
        _ => {
            let leftover: Vec<String> = stack.iter().map(|v| v.to_string()).collect();
            Err(UnitError::malformed(format!(
                "'{}' leaves unused operands: {}",
                expr,
                leftover.join(", ")
            )))
        }
    }
}
