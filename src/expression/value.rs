use std::fmt::Write as _;

use crate::{
    error::{EvaluationError, TypeMismatch},
    expression::evaluator::EvalResult,
    util::num::{f32_to_i64_truncated, i64_to_f32},
};

/// Represents a value of the expression language.
///
/// Values are immutable. Operators and functions always produce new values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A signed 64 bit integer.
    Int(i64),
    /// A single precision float.
    Float(f32),
    /// A string of Unicode code points.
    Str(String),
    /// A boolean, produced by comparisons and logical operators.
    Bool(bool),
    /// A value an extension could not resolve.
    ///
    /// It never comes out of a literal or a builtin; any operator or function
    /// receiving it fails.
    Unresolved,
}

/// The type tag of a [`Value`], also used in operator and function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Matches every resolved value. Only used in signatures.
    Any,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::Str`
    Str,
    /// `Value::Bool`
    Bool,
    /// `Value::Unresolved`
    Unresolved,
}

impl ValueType {
    /// Tests whether a value is accepted at a signature position of this type.
    ///
    /// # Example
    /// ```
    /// use commentpp::expression::value::{Value, ValueType};
    ///
    /// assert!(ValueType::Any.accepts(&Value::Int(1)));
    /// assert!(!ValueType::Any.accepts(&Value::Unresolved));
    /// assert!(!ValueType::Float.accepts(&Value::Int(1)));
    /// ```
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => !matches!(value, Value::Unresolved),
            other => other == value.value_type(),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Any => "ANY",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Str => "STR",
            Self::Bool => "BOOL",
            Self::Unresolved => "UNRESOLVED",
        };
        write!(f, "{name}")
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl Value {
    /// Returns the type tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::Bool(_) => ValueType::Bool,
            Self::Unresolved => ValueType::Unresolved,
        }
    }

    const fn mismatch(&self, expected: ValueType) -> TypeMismatch {
        TypeMismatch { expected,
                       found: self.value_type() }
    }

    /// Projects the value to an integer.
    ///
    /// Floats are truncated towards zero.
    ///
    /// # Example
    /// ```
    /// use commentpp::expression::value::Value;
    ///
    /// assert_eq!(Value::Float(2.9).as_long().unwrap(), 2);
    /// assert!(Value::Str("2".into()).as_long().is_err());
    /// ```
    pub fn as_long(&self) -> EvalResult<i64> {
        match self {
            Self::Int(v) => Ok(*v),
            Self::Float(v) => {
                Ok(f32_to_i64_truncated(*v, EvaluationError::NotAnInteger { value: *v })?)
            },
            other => Err(other.mismatch(ValueType::Int).into()),
        }
    }

    /// Projects the value to a float.
    ///
    /// Integers are widened to the nearest float, so magnitudes above `2^24`
    /// may round.
    pub fn as_float(&self) -> EvalResult<f32> {
        match self {
            Self::Float(v) => Ok(*v),
            Self::Int(v) => Ok(i64_to_f32(*v)),
            other => Err(other.mismatch(ValueType::Float).into()),
        }
    }

    /// Projects the value to a string slice. Only strings qualify.
    pub fn as_string(&self) -> EvalResult<&str> {
        match self {
            Self::Str(v) => Ok(v),
            other => Err(other.mismatch(ValueType::Str).into()),
        }
    }

    /// Projects the value to a boolean. Only booleans qualify.
    pub fn as_boolean(&self) -> EvalResult<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(other.mismatch(ValueType::Bool).into()),
        }
    }

    /// Renders the value as a literal that parses back to an equal value.
    ///
    /// Strings are quoted and escaped. Numbers that have no literal form of
    /// their own, such as `i64::MIN` or infinities, are rendered as small
    /// expressions.
    ///
    /// # Example
    /// ```
    /// use commentpp::expression::{evaluator::evaluate, value::Value};
    ///
    /// let value = Value::Str("say \"hi\"\n".into());
    /// assert_eq!(value.to_literal(), r#""say \"hi\"\n""#);
    /// assert_eq!(evaluate(&value.to_literal()).unwrap(), value);
    /// ```
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Int(i64::MIN) => format!("({} - 1)", i64::MIN + 1),
            Self::Int(v) => v.to_string(),
            Self::Float(v) if v.is_nan() => "(0.0 / 0.0)".to_string(),
            Self::Float(v) if v.is_infinite() => {
                if v.is_sign_positive() {
                    "(1.0 / 0.0)".to_string()
                } else {
                    "(-1.0 / 0.0)".to_string()
                }
            },
            Self::Float(_) | Self::Bool(_) | Self::Unresolved => self.to_string(),
            Self::Str(v) => quote(v),
        }
    }
}

/// Quotes and escapes a string so the lexer reads it back unchanged.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            },
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => {
                let text = v.to_string();
                if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
                    write!(f, "{text}.0")
                } else {
                    write!(f, "{text}")
                }
            },
            Self::Str(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Unresolved => write!(f, "<unresolved>"),
        }
    }
}
