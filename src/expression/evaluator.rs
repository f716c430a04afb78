use std::collections::HashMap;

use crate::{
    error::{EvaluationError, ExpressionError},
    expression::{
        function::call_function,
        item::{ExpressionItem, ExpressionTree},
        operator::apply_operator,
        parser::parse_expression,
        value::Value,
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or an
/// `ExpressionError` describing the failure.
pub type EvalResult<T> = Result<T, ExpressionError>;

/// Supplies variable values to the evaluator.
///
/// Names passed to [`ExpressionContext::variable`] are already lower case.
pub trait ExpressionContext {
    /// Returns the value of a variable, or `None` if it is not defined.
    fn variable(&self, name: &str) -> Option<Value>;
}

/// A context without any variables.
pub struct NoVariables;

impl ExpressionContext for NoVariables {
    fn variable(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl ExpressionContext for HashMap<String, Value> {
    fn variable(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl ExpressionTree {
    /// Evaluates the tree against a variable context.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    ///
    /// use commentpp::expression::{parser::parse_expression, value::Value};
    ///
    /// let tree = parse_expression("Version >= 2 && name == \"app\"").unwrap();
    /// let variables = HashMap::from([("version".to_string(), Value::Int(3)),
    ///                                ("name".to_string(), Value::Str("app".into()))]);
    ///
    /// assert_eq!(tree.evaluate(&variables).unwrap(), Value::Bool(true));
    /// ```
    pub fn evaluate(&self, context: &dyn ExpressionContext) -> EvalResult<Value> {
        evaluate_item(&self.root, context)
    }
}

/// Evaluates an expression item.
///
/// Evaluation is strict: every operand and argument is evaluated, left to
/// right, before the operator or function is applied. `&&` and `||` do not
/// short-circuit.
///
/// # Errors
/// Returns an `ExpressionError` for unknown variables or functions, type
/// mismatches and every failure of the applied operators and functions.
pub fn evaluate_item(item: &ExpressionItem, context: &dyn ExpressionContext) -> EvalResult<Value> {
    match item {
        ExpressionItem::Value(value) => Ok(value.clone()),
        ExpressionItem::Variable { name, .. } => {
            context.variable(name)
                   .ok_or_else(|| EvaluationError::UnknownVariable { name: name.clone() }.into())
        },
        ExpressionItem::Function { name, arguments, .. } => {
            let values = arguments.iter()
                                  .map(|argument| evaluate_item(argument, context))
                                  .collect::<EvalResult<Vec<_>>>()?;
            call_function(name, &values)
        },
        ExpressionItem::Operator { operator, operands, .. } => {
            debug_assert_eq!(operands.len(), operator.arity());
            let values = operands.iter()
                                 .map(|operand| evaluate_item(operand, context))
                                 .collect::<EvalResult<Vec<_>>>()?;
            apply_operator(*operator, &values)
        },
    }
}

/// Parses and evaluates expression text without any variables.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Example
/// ```
/// use commentpp::expression::{evaluator::evaluate, value::Value};
///
/// assert_eq!(evaluate("3 < 3.5").unwrap(), Value::Bool(true));
/// assert_eq!(evaluate("1 + 2 * 3").unwrap(), Value::Int(7));
/// assert!(evaluate("unknown + 1").is_err());
/// ```
pub fn evaluate(source: &str) -> EvalResult<Value> {
    parse_expression(source)?.evaluate(&NoVariables)
}
