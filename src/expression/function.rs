use std::{fmt::Write as _, num::IntErrorKind};

use crate::{
    error::EvaluationError,
    expression::{
        evaluator::EvalResult,
        signature::{Signature, dispatch},
        value::{
            Value,
            ValueType::{Bool, Float, Int, Str},
        },
    },
    util::num::{f32_to_i64_truncated, usize_to_i64_checked},
};

/// A builtin function: its name and the signatures it accepts.
///
/// All signatures of one function have the same arity.
pub struct FunctionDescriptor {
    /// Function name, lower case.
    pub name:       &'static str,
    /// Accepted signatures in declaration order.
    pub signatures: &'static [Signature],
}

impl FunctionDescriptor {
    /// Returns the number of arguments the function takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.signatures.first().map_or(0, |signature| signature.types.len())
    }
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - the signatures the function accepts, each with its rule.
///
/// The macro produces:
/// - `FUNCTION_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => [ $( $signature:expr ),* $(,)? ]
        ),* $(,)?
    ) => {
        static FUNCTION_TABLE: &[FunctionDescriptor] = &[
            $(
                FunctionDescriptor { name: $name, signatures: &[$($signature),*] },
            )*
        ];
        /// Names of all builtin functions.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "abs"       => [Signature::new(&[Int], abs_int),
                    Signature::new(&[Float], |args| Ok(Value::Float(args[0].as_float()?.abs())))],
    "round"     => [Signature::new(&[Float], round),
                    Signature::new(&[Int], |args| Ok(args[0].clone()))],
    "str2int"   => [Signature::new(&[Str], str2int)],
    "strlen"    => [Signature::new(&[Str], strlen)],
    "issubstr"  => [Signature::new(&[Str, Str], issubstr)],
    "str2web"   => [Signature::new(&[Str], |args| Ok(Value::Str(escape_html(args[0].as_string()?))))],
    "str2xml"   => [Signature::new(&[Str], |args| Ok(Value::Str(escape_xml(args[0].as_string()?))))],
    "str2csv"   => [Signature::new(&[Str], |args| Ok(Value::Str(escape_csv(args[0].as_string()?))))],
    "str2js"    => [Signature::new(&[Str], |args| Ok(Value::Str(escape_js(args[0].as_string()?))))],
    "str2java"  => [Signature::new(&[Str, Bool], str2java)],
    "trimlines" => [Signature::new(&[Str], trimlines)],
}

/// Looks up a builtin function by its lower case name.
#[must_use]
pub fn find_function(name: &str) -> Option<&'static FunctionDescriptor> {
    FUNCTION_TABLE.iter().find(|descriptor| descriptor.name == name)
}

/// Calls a builtin function with already evaluated arguments.
///
/// # Errors
/// Returns an `EvaluationError` if the function is unknown, the argument count
/// does not match its arity, no signature accepts the argument types, or the
/// function itself fails.
///
/// # Example
/// ```
/// use commentpp::expression::{function::call_function, value::Value};
///
/// let n = call_function("str2int", &[Value::Str("  42  ".into())]).unwrap();
/// assert_eq!(n, Value::Int(42));
///
/// assert!(call_function("str2int", &[Value::Str("abc".into())]).is_err());
/// ```
pub fn call_function(name: &str, args: &[Value]) -> EvalResult<Value> {
    let descriptor =
        find_function(name).ok_or_else(|| EvaluationError::UnknownFunction { name: name.to_string() })?;

    if descriptor.arity() != args.len() {
        return Err(EvaluationError::WrongArgumentCount { name:     name.to_string(),
                                                         expected: descriptor.arity(),
                                                         found:    args.len(), }.into());
    }

    dispatch(descriptor.name, descriptor.signatures, args)
}

fn abs_int(args: &[Value]) -> EvalResult<Value> {
    args[0].as_long()?
           .checked_abs()
           .map(Value::Int)
           .ok_or_else(|| EvaluationError::IntegerOverflow { operation: "abs".to_string() }.into())
}

/// Rounds half away from zero.
fn round(args: &[Value]) -> EvalResult<Value> {
    let value = args[0].as_float()?;
    let rounded = f32_to_i64_truncated(value.round(), EvaluationError::NotAnInteger { value })?;
    Ok(Value::Int(rounded))
}

/// Parses a decimal integer after trimming surrounding whitespace.
fn str2int(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_string()?;
    match text.trim().parse::<i64>() {
        Ok(value) => Ok(Value::Int(value)),
        Err(error) if matches!(error.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(EvaluationError::IntegerOverflow { operation: "str2int".to_string() }.into())
        },
        Err(_) => Err(EvaluationError::InvalidNumber { text: text.to_string() }.into()),
    }
}

/// Counts code points.
fn strlen(args: &[Value]) -> EvalResult<Value> {
    let count = args[0].as_string()?.chars().count();
    let length = usize_to_i64_checked(count,
                                      EvaluationError::IntegerOverflow { operation: "strlen".to_string() })?;
    Ok(Value::Int(length))
}

/// Tests, ignoring case, whether the first string occurs in the second.
fn issubstr(args: &[Value]) -> EvalResult<Value> {
    let needle = args[0].as_string()?.to_lowercase();
    let haystack = args[1].as_string()?.to_lowercase();
    Ok(Value::Bool(haystack.contains(&needle)))
}

/// Escapes Java string content. With the split flag set, multi-line text
/// becomes one quoted segment per line joined by `+`.
fn str2java(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_string()?;
    let split = args[1].as_boolean()?;

    if !split {
        return Ok(Value::Str(escape_java(text)));
    }

    let segments = text.split_inclusive('\n').map(escape_java).collect::<Vec<_>>();
    Ok(Value::Str(segments.join("\"\n+\"")))
}

/// Trims every line and drops the empty ones.
fn trimlines(args: &[Value]) -> EvalResult<Value> {
    let text = args[0].as_string()?;
    let lines = text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>();
    Ok(Value::Str(lines.join("\n")))
}

/// Escapes text for HTML, including every non-ASCII character as a numeric
/// entity.
///
/// # Example
/// ```
/// use commentpp::expression::function::escape_html;
///
/// assert_eq!(escape_html("a < b & \"é\""), "a &lt; b &amp; &quot;&#233;&quot;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c if !c.is_ascii() => {
                let _ = write!(out, "&#{};", u32::from(c));
            },
            c => out.push(c),
        }
    }
    out
}

/// Escapes the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Quotes a CSV field if it contains a separator, quote or line break.
///
/// # Example
/// ```
/// use commentpp::expression::function::escape_csv;
///
/// assert_eq!(escape_csv("plain"), "plain");
/// assert_eq!(escape_csv("a,\"b\""), "\"a,\"\"b\"\"\"");
/// ```
#[must_use]
pub fn escape_csv(text: &str) -> String {
    if !text.contains([',', '"', '\n', '\r']) {
        return text.to_string();
    }
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Escapes a character the way C-like string literals do, returning `false`
/// if the character needs no escape.
fn push_c_escape(out: &mut String, ch: char) -> bool {
    match ch {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\'' => out.push_str("\\'"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{8}' => out.push_str("\\b"),
        '\u{c}' => out.push_str("\\f"),
        c if c.is_control() => {
            let _ = write!(out, "\\u{:04X}", u32::from(c));
        },
        _ => return false,
    }
    true
}

/// Escapes text for a JavaScript string literal; `/` is escaped too so the
/// result is safe inside a script element.
#[must_use]
pub fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '/' {
            out.push_str("\\/");
        } else if !push_c_escape(&mut out, ch) {
            out.push(ch);
        }
    }
    out
}

/// Escapes text for a Java string literal; non-ASCII characters become
/// `\uXXXX` escapes.
#[must_use]
pub fn escape_java(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if push_c_escape(&mut out, ch) {
            continue;
        }
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04X}");
            }
        }
    }
    out
}
