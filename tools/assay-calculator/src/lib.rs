//! Calculator tool for arithmetic expressions.
//!
//! Expressions are first reduced to digits, `.`, parentheses and the
//! operators `+ - * /`; everything else is dropped. The remainder is parsed
//! by a small recursive-descent parser supporting unary signs, `**` (power)
//! and `//` (floor division). There is no general-purpose evaluator behind it.

use assay_core::tool::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Maximum allowed length for calculator expressions.
const MAX_EXPRESSION_LENGTH: usize = 1000;

/// Maximum nesting depth of parentheses and unary operators.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq)]
enum CalcError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected '{0}' at position {1}")]
    Unexpected(char, usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("result is not a finite number")]
    NotFinite,
}

/// Keep only the characters the calculator understands.
fn sanitize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/().".contains(*c))
        .collect()
}

struct Parser<'a> {
    chars: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.chars.get(self.pos).copied()
    }

    fn peek_pair(&self, pair: &[u8; 2]) -> bool {
        self.chars.get(self.pos..self.pos + 2) == Some(pair.as_slice())
    }

    fn parse(mut self) -> Result<f64, CalcError> {
        if self.chars.is_empty() {
            return Err(CalcError::Empty);
        }
        let value = self.expr()?;
        match self.peek() {
            None => Ok(value),
            Some(c) => Err(CalcError::Unexpected(c as char, self.pos)),
        }
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '//') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            if self.peek_pair(b"//") {
                self.pos += 2;
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value = (value / rhs).floor();
            } else if self.peek() == Some(b'*') {
                self.pos += 1;
                value *= self.unary()?;
            } else if self.peek() == Some(b'/') {
                self.pos += 1;
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value /= rhs;
            } else {
                break;
            }
        }
        Ok(value)
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                self.enter()?;
                let value = -self.unary()?;
                self.depth -= 1;
                Ok(value)
            }
            Some(b'+') => {
                self.pos += 1;
                self.enter()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(value)
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek_pair(b"**") {
            self.pos += 2;
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                self.enter()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(c) => Err(CalcError::Unexpected(c as char, self.pos)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(CalcError::Unexpected(c as char, self.pos)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'.') {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.chars[start..self.pos]).into_owned();
        text.parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(text))
    }
}

/// Evaluate a sanitized arithmetic expression.
fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let value = Parser::new(expression).parse()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NotFinite)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Calculator tool for basic arithmetic.
///
/// # Example
///
/// ```no_run
/// use assay_calculator::Calculator;
/// use assay_core::tool::Tool;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = Calculator.execute(json!({"expression": "2 + 3 * 4"})).await?;
/// assert_eq!(result.content, "14");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "A simple calculator that performs basic arithmetic operations \
         (+, -, *, /, ** and parentheses). Use it for any arithmetic instead of \
         computing results yourself."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate, e.g. '2 + 3 * 4'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let expression = input
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("Missing 'expression' field".into()))?;

        if expression.len() > MAX_EXPRESSION_LENGTH {
            return Err(ToolError::InvalidInput(format!(
                "Expression too long ({} chars, max {})",
                expression.len(),
                MAX_EXPRESSION_LENGTH
            )));
        }

        let sanitized = sanitize(expression);
        let value = evaluate(&sanitized)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid expression: {}", e)))?;

        Ok(ToolResult::with_metadata(
            format_number(value),
            json!({ "expression": sanitized }),
        ))
    }
}
