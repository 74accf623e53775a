//! Coercion of the loosely-typed argument bag into primitive values
//!
//! A key counts as absent when it is missing, `null` or an empty string.

use crate::error::OperationError;
use serde_json::{Map, Value};

/// Borrowed view over the JSON object carrying a call's arguments.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentBag<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> ArgumentBag<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map: Some(map) }
    }

    /// A bag with no arguments at all.
    pub fn empty() -> Self {
        Self { map: None }
    }

    /// Accepts any JSON value; anything but an object is treated as empty.
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::new(map),
            _ => Self::empty(),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        match self.map?.get(key)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            value => Some(value),
        }
    }

    /// String-typed argument, or `None` when absent.
    pub fn string(&self, key: &str) -> Result<Option<String>, OperationError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(n.as_f64().map(format_number)),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(OperationError::invalid(key, "expected a string")),
        }
    }

    pub fn required_string(&self, key: &str) -> Result<String, OperationError> {
        self.string(key)?
            .ok_or_else(|| OperationError::MissingArgument(key.to_string()))
    }

    pub fn string_or(&self, key: &str, default: &str) -> Result<String, OperationError> {
        Ok(self.string(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Required output path; see [`not_option_like`].
    pub fn output_path(&self, key: &str) -> Result<String, OperationError> {
        not_option_like(key, self.required_string(key)?)
    }

    /// Number-typed argument; numeric strings are accepted.
    pub fn number(&self, key: &str) -> Result<Option<f64>, OperationError> {
        let parsed = match self.present(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(OperationError::invalid(key, "expected a number")),
        }
    }

    pub fn number_or(&self, key: &str, default: f64) -> Result<f64, OperationError> {
        Ok(self.number(key)?.unwrap_or(default))
    }
}

/// Reject a value ffmpeg would read as an option when it stands as a bare
/// output token.
pub fn not_option_like(key: &str, value: String) -> Result<String, OperationError> {
    if value.starts_with('-') {
        return Err(OperationError::invalid(key, "must not start with '-'"));
    }
    Ok(value)
}

/// Render a number the way a client would write it: integral values
/// without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Split a raw option string into argument tokens.
///
/// Whitespace separates tokens, single and double quotes group, and a
/// backslash escapes the next character outside single quotes.
pub fn split_options(key: &str, raw: &str) -> Result<Vec<String>, OperationError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(OperationError::invalid(key, "unterminated quote")),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => current.push(c),
                            None => {
                                return Err(OperationError::invalid(key, "unterminated quote"))
                            }
                        },
                        Some(c) => current.push(c),
                        None => return Err(OperationError::invalid(key, "unterminated quote")),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
