//! Condition expressions for the `one-of` and `for-each` tags.
//!
//! Conditions are strings such as `"${size} > 2 and '${name}' != 'default'"`.
//! Parameters are substituted by the string resolver first, so this module only
//! ever sees literals. The grammar is deliberately small:
//!
//! ```text
//! expr       := or
//! or         := and ( ("or" | "||") and )*
//! and        := not ( ("and" | "&&") not )*
//! not        := ("not" | "!") not | comparison
//! comparison := operand ( ("==" | "!=" | "<" | "<=" | ">" | ">=") operand )*
//! operand    := number | string | True | False | true | false | None | "(" expr ")"
//! ```
//!
//! Comparisons chain like `1 < x < 3`. `and`/`or` yield one of their operands,
//! but the expression as a whole must evaluate to a boolean.

use crate::core::{Result, TemplateError};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Eof,
}

/// Operators ordered so that two-character forms match first.
const OPERATORS: [&str; 10] = ["==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "-"];

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some(&'\\') => {
                            if let Some(&escaped) = chars.get(i + 1) {
                                text.push(escaped);
                            }
                            i += 2;
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let number =
                    text.parse::<f64>().map_err(|_| format!("invalid number literal '{text}'"))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
                    return Err(format!("unexpected character '{c}'"));
                };
                tokens.push(Token::Op(*op));
                i += op.len();
            }
        }
    }
    tokens.push(Token::Eof);
    Ok(tokens)
}

/// A value produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Bool(bool),
    Number(f64),
    Str(String),
    None,
}

impl Operand {
    fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::None => false,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::None => "None",
        }
    }

    /// Booleans take part in numeric comparisons as 0 and 1.
    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn compare(&self, op: &str, other: &Self) -> std::result::Result<bool, String> {
        let numbers = self.as_number().zip(other.as_number());
        match op {
            "==" => return Ok(numbers.map_or_else(|| self == other, |(a, b)| a == b)),
            "!=" => return Ok(numbers.map_or_else(|| self != other, |(a, b)| a != b)),
            _ => {}
        }
        let ordering = match (self, other) {
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            _ => numbers.and_then(|(a, b)| a.partial_cmp(&b)),
        };
        let Some(ordering) = ordering else {
            return Err(format!(
                "'{op}' not supported between {} and {}",
                self.describe(),
                other.describe()
            ));
        };
        Ok(match op {
            "<" => ordering == Ordering::Less,
            "<=" => ordering != Ordering::Greater,
            ">" => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Nesting depth of operands that `and`/`or` short-circuit past. They are
    /// parsed but not compared.
    skipping: usize,
}

impl Parser {
    /// The token stream always ends with `Eof`, which is returned forever.
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        self.pos += 1;
        token
    }

    fn eat_word(&mut self, word: &str, symbol: &str) -> bool {
        let matched = match self.peek() {
            Token::Ident(ident) => ident == word,
            Token::Op(op) => *op == symbol,
            _ => false,
        };
        if matched {
            self.pos += 1;
        }
        matched
    }

    /// Parse an operand without evaluating its comparisons.
    fn skip<F>(&mut self, parse: F) -> std::result::Result<(), String>
    where
        F: FnOnce(&mut Self) -> std::result::Result<Operand, String>,
    {
        self.skipping += 1;
        let parsed = parse(self);
        self.skipping -= 1;
        parsed.map(|_| ())
    }

    fn parse_or(&mut self) -> std::result::Result<Operand, String> {
        let mut left = self.parse_and()?;
        while self.eat_word("or", "||") {
            if left.truthy() {
                self.skip(Self::parse_and)?;
            } else {
                left = self.parse_and()?;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> std::result::Result<Operand, String> {
        let mut left = self.parse_not()?;
        while self.eat_word("and", "&&") {
            if left.truthy() {
                left = self.parse_not()?;
            } else {
                self.skip(Self::parse_not)?;
            }
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> std::result::Result<Operand, String> {
        if self.eat_word("not", "!") {
            let operand = self.parse_not()?;
            return Ok(Operand::Bool(!operand.truthy()));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> std::result::Result<Operand, String> {
        let mut left = self.parse_operand()?;
        let mut result: Option<bool> = None;
        loop {
            let op = match self.peek() {
                Token::Op(op) if matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=") => *op,
                _ => break,
            };
            self.bump();
            let right = self.parse_operand()?;
            let holds = self.skipping == 0 && left.compare(op, &right)?;
            result = Some(result.unwrap_or(true) && holds);
            left = right;
        }
        Ok(match result {
            Some(holds) => Operand::Bool(holds),
            None => left,
        })
    }

    fn parse_operand(&mut self) -> std::result::Result<Operand, String> {
        match self.bump() {
            Token::Number(n) => Ok(Operand::Number(n)),
            Token::Str(s) => Ok(Operand::Str(s)),
            Token::Op("-") => match self.bump() {
                Token::Number(n) => Ok(Operand::Number(-n)),
                other => Err(format!("expected a number after '-', found {other:?}")),
            },
            Token::Ident(ident) => match ident.as_str() {
                "True" | "true" => Ok(Operand::Bool(true)),
                "False" | "false" => Ok(Operand::Bool(false)),
                "None" => Ok(Operand::None),
                _ => Err(format!("unknown name '{ident}'")),
            },
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.bump() {
                    Token::RParen => Ok(inner),
                    other => Err(format!("expected ')', found {other:?}")),
                }
            }
            Token::Eof => Err("unexpected end of expression".to_string()),
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

/// Evaluate a condition expression to a boolean.
///
/// # Errors
///
/// Returns [`TemplateError::Expression`] if the text does not parse or does not
/// evaluate to a boolean.
///
/// # Examples
///
/// ```rust
/// use jsonteng::templating::evaluate;
///
/// assert!(evaluate("1 < 2 <= 2 and not False").unwrap());
/// assert!(!evaluate("'eth0' == 'eth1'").unwrap());
/// assert!(evaluate("42").is_err());
/// ```
pub fn evaluate(expression: &str) -> Result<bool> {
    let fail = |reason: String| TemplateError::Expression {
        expression: expression.to_string(),
        reason,
    };

    let mut parser = Parser {
        tokens: tokenize(expression).map_err(fail)?,
        pos: 0,
        skipping: 0,
    };
    let result = parser.parse_or().map_err(fail)?;
    if *parser.peek() != Token::Eof {
        return Err(fail(format!("unexpected trailing token {:?}", parser.peek())));
    }
    match result {
        Operand::Bool(b) => Ok(b),
        other => Err(fail(format!("result is a {}, not a boolean", other.describe()))),
    }
}

/// Interpret a resolved condition.
///
/// JSON booleans are used directly and strings are evaluated as expressions.
///
/// # Errors
///
/// Returns [`TemplateError::Expression`] for any other value or for a string that
/// does not evaluate to a boolean.
pub fn evaluate_condition(condition: &Value) -> Result<bool> {
    match condition {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => evaluate(s),
        other => Err(TemplateError::Expression {
            expression: other.to_string(),
            reason: "condition is neither a string nor a boolean".to_string(),
        }),
    }
}
