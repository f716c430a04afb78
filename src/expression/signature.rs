use crate::{
    error::EvaluationError,
    expression::{
        evaluator::EvalResult,
        value::{Value, ValueType},
    },
};

/// Evaluation rule bound to one signature.
///
/// A rule receives the evaluated arguments, already checked against its
/// signature, and returns the result.
pub type Rule = fn(&[Value]) -> EvalResult<Value>;

/// One accepted argument type combination of an operator or function and the
/// rule that evaluates it.
pub struct Signature {
    /// Argument types, one per position.
    pub types: &'static [ValueType],
    rule:      Rule,
}

impl Signature {
    /// Binds a rule to a type combination.
    #[must_use]
    pub const fn new(types: &'static [ValueType], rule: Rule) -> Self {
        Self { types, rule }
    }

    /// Tests whether the runtime arguments match this signature.
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.types.len() == args.len()
        && self.types.iter().zip(args).all(|(ty, value)| ty.accepts(value))
    }
}

/// Rejects argument lists that contain an unresolved value.
///
/// # Errors
/// Returns `EvaluationError::UnresolvedOperand` naming the operator or
/// function.
pub fn ensure_resolved(name: &str, args: &[Value]) -> EvalResult<()> {
    if args.iter().any(|value| matches!(value, Value::Unresolved)) {
        return Err(EvaluationError::UnresolvedOperand { name: name.to_string() }.into());
    }
    Ok(())
}

/// Evaluates the first signature, in declaration order, that accepts the
/// arguments.
///
/// # Parameters
/// - `name`: Operator symbol or function name for error messages.
/// - `signatures`: Candidate signatures; order is significant.
/// - `args`: Evaluated arguments.
///
/// # Errors
/// Returns `EvaluationError::UnresolvedOperand` if an argument is unresolved,
/// `EvaluationError::NoMatchingSignature` if no signature accepts the
/// arguments, or whatever the selected rule fails with.
pub fn dispatch(name: &str, signatures: &[Signature], args: &[Value]) -> EvalResult<Value> {
    ensure_resolved(name, args)?;

    let Some(signature) = signatures.iter().find(|signature| signature.accepts(args)) else {
        return Err(EvaluationError::NoMatchingSignature { name:  name.to_string(),
                                                          types: args.iter()
                                                                     .map(Value::value_type)
                                                                     .collect(), }.into());
    };

    (signature.rule)(args)
}
