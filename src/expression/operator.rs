use crate::{
    error::{EvaluationError, ExpressionError},
    expression::{
        evaluator::EvalResult,
        item::Operator,
        signature::{Signature, dispatch},
        value::{
            Value,
            ValueType::{Any, Bool, Float, Int, Str},
        },
    },
};

/// Builds the four numeric signatures of an operator, integer first, followed
/// by any extra signatures.
///
/// Mixed integer and float operands use the float rule; the integer operand
/// is promoted with a checked conversion.
macro_rules! numeric {
    ($int:expr, $float:expr $(, $extra:expr)* $(,)?) => {
        &[Signature::new(&[Int, Int], $int),
          Signature::new(&[Float, Float], $float),
          Signature::new(&[Int, Float], $float),
          Signature::new(&[Float, Int], $float),
          $($extra,)*]
    };
}

fn int_pair(args: &[Value]) -> EvalResult<(i64, i64)> {
    Ok((args[0].as_long()?, args[1].as_long()?))
}

fn float_pair(args: &[Value]) -> EvalResult<(f32, f32)> {
    Ok((args[0].as_float()?, args[1].as_float()?))
}

fn str_pair(args: &[Value]) -> EvalResult<(&str, &str)> {
    Ok((args[0].as_string()?, args[1].as_string()?))
}

fn bool_pair(args: &[Value]) -> EvalResult<(bool, bool)> {
    Ok((args[0].as_boolean()?, args[1].as_boolean()?))
}

fn overflow(operator: Operator) -> ExpressionError {
    EvaluationError::IntegerOverflow { operation: operator.symbol().to_string() }.into()
}

fn concat(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Str(format!("{}{}", args[0], args[1])))
}

fn divide(args: &[Value]) -> EvalResult<Value> {
    let (left, right) = int_pair(args)?;
    if right == 0 {
        return Err(EvaluationError::DivisionByZero.into());
    }
    left.checked_div(right)
        .map(Value::Int)
        .ok_or_else(|| overflow(Operator::Div))
}

fn remainder(args: &[Value]) -> EvalResult<Value> {
    let (left, right) = int_pair(args)?;
    if right == 0 {
        return Err(EvaluationError::DivisionByZero.into());
    }
    left.checked_rem(right)
        .map(Value::Int)
        .ok_or_else(|| overflow(Operator::Mod))
}

static ADD: &[Signature] = numeric!(|args| {
                                        let (l, r) = int_pair(args)?;
                                        l.checked_add(r)
                                         .map(Value::Int)
                                         .ok_or_else(|| overflow(Operator::Add))
                                    },
                                    |args| {
                                        let (l, r) = float_pair(args)?;
                                        Ok(Value::Float(l + r))
                                    },
                                    Signature::new(&[Str, Any], concat),
                                    Signature::new(&[Any, Str], concat));

static SUB: &[Signature] = numeric!(|args| {
                                        let (l, r) = int_pair(args)?;
                                        l.checked_sub(r)
                                         .map(Value::Int)
                                         .ok_or_else(|| overflow(Operator::Sub))
                                    },
                                    |args| {
                                        let (l, r) = float_pair(args)?;
                                        Ok(Value::Float(l - r))
                                    });

static MUL: &[Signature] = numeric!(|args| {
                                        let (l, r) = int_pair(args)?;
                                        l.checked_mul(r)
                                         .map(Value::Int)
                                         .ok_or_else(|| overflow(Operator::Mul))
                                    },
                                    |args| {
                                        let (l, r) = float_pair(args)?;
                                        Ok(Value::Float(l * r))
                                    });

static DIV: &[Signature] = numeric!(divide, |args| {
    let (l, r) = float_pair(args)?;
    Ok(Value::Float(l / r))
});

static MOD: &[Signature] = numeric!(remainder, |args| {
    let (l, r) = float_pair(args)?;
    Ok(Value::Float(l % r))
});

/// Defines a comparison table over numbers and strings, plus any extra
/// signatures.
macro_rules! comparison {
    ($name:ident, $op:tt $(, $extra:expr)*) => {
        static $name: &[Signature] = numeric!(|args| {
                                                  let (l, r) = int_pair(args)?;
                                                  Ok(Value::Bool(l $op r))
                                              },
                                              |args| {
                                                  let (l, r) = float_pair(args)?;
                                                  Ok(Value::Bool(l $op r))
                                              },
                                              Signature::new(&[Str, Str], |args| {
                                                  let (l, r) = str_pair(args)?;
                                                  Ok(Value::Bool(l $op r))
                                              })
                                              $(, $extra)*);
    };
}

comparison!(EQUAL, ==, Signature::new(&[Bool, Bool], |args| {
                let (l, r) = bool_pair(args)?;
                Ok(Value::Bool(l == r))
            }));
comparison!(NOT_EQUAL, !=, Signature::new(&[Bool, Bool], |args| {
                let (l, r) = bool_pair(args)?;
                Ok(Value::Bool(l != r))
            }));
comparison!(LESS, <);
comparison!(GREATER, >);
comparison!(LESS_EQUAL, <=);
comparison!(GREATER_EQUAL, >=);

/// Defines a table that is logical on booleans and bitwise on integers.
macro_rules! logical {
    ($name:ident, $op:tt) => {
        static $name: &[Signature] = &[Signature::new(&[Bool, Bool], |args| {
                                           let (l, r) = bool_pair(args)?;
                                           Ok(Value::Bool(l $op r))
                                       }),
                                       Signature::new(&[Int, Int], |args| {
                                           let (l, r) = int_pair(args)?;
                                           Ok(Value::Int(l $op r))
                                       })];
    };
}

logical!(AND, &);
logical!(OR, |);
logical!(XOR, ^);

static NOT: &[Signature] = &[Signature::new(&[Bool], |args| Ok(Value::Bool(!args[0].as_boolean()?))),
                             Signature::new(&[Int], |args| Ok(Value::Int(!args[0].as_long()?)))];

static NEGATE: &[Signature] = &[Signature::new(&[Int], |args| {
                                    args[0].as_long()?
                                           .checked_neg()
                                           .map(Value::Int)
                                           .ok_or_else(|| overflow(Operator::Negate))
                                }),
                                Signature::new(&[Float], |args| Ok(Value::Float(-args[0].as_float()?)))];

/// Returns the signatures of an operator in declaration order.
#[must_use]
pub const fn signatures(operator: Operator) -> &'static [Signature] {
    match operator {
        Operator::Add => ADD,
        Operator::Sub => SUB,
        Operator::Mul => MUL,
        Operator::Div => DIV,
        Operator::Mod => MOD,
        Operator::Equal => EQUAL,
        Operator::NotEqual => NOT_EQUAL,
        Operator::Less => LESS,
        Operator::Greater => GREATER,
        Operator::LessEqual => LESS_EQUAL,
        Operator::GreaterEqual => GREATER_EQUAL,
        Operator::And => AND,
        Operator::Or => OR,
        Operator::Xor => XOR,
        Operator::Not => NOT,
        Operator::Negate => NEGATE,
    }
}

/// Applies an operator to already evaluated operands.
///
/// The first signature accepting the operand types wins; `&&` and `||` are
/// logical on booleans and bitwise on integers.
///
/// # Errors
/// Returns an `EvaluationError` if an operand is unresolved, no signature
/// matches, an integer division by zero or an integer overflow occurs.
///
/// # Example
/// ```
/// use commentpp::expression::{item::Operator, operator::apply_operator, value::Value};
///
/// let sum = apply_operator(Operator::Add, &[Value::Str("v".into()), Value::Int(2)]);
/// assert_eq!(sum.unwrap(), Value::Str("v2".into()));
///
/// let less = apply_operator(Operator::Less, &[Value::Int(3), Value::Float(3.5)]);
/// assert_eq!(less.unwrap(), Value::Bool(true));
///
/// assert!(apply_operator(Operator::Div, &[Value::Int(1), Value::Int(0)]).is_err());
/// ```
pub fn apply_operator(operator: Operator, operands: &[Value]) -> EvalResult<Value> {
    dispatch(operator.symbol(), signatures(operator), operands)
}
