use crate::expression::value::ValueType;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A value had a type that cannot be projected to the one that was required.
pub struct TypeMismatch {
    /// The type that was required.
    pub expected: ValueType,
    /// The type that was found.
    pub found:    ValueType,
}

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur while evaluating an expression tree.
pub enum EvaluationError {
    /// A variable that is neither special, local nor global.
    UnknownVariable {
        /// The normalized variable name.
        name: String,
    },
    /// A call to a function that is not registered.
    UnknownFunction {
        /// The function name.
        name: String,
    },
    /// A function was called with the wrong number of arguments.
    WrongArgumentCount {
        /// The function name.
        name:     String,
        /// The number of arguments the function takes.
        expected: usize,
        /// The number of arguments supplied.
        found:    usize,
    },
    /// No declared signature of an operator or function accepts the runtime
    /// argument types.
    NoMatchingSignature {
        /// The operator symbol or function name.
        name:  String,
        /// The runtime argument types that were attempted.
        types: Vec<ValueType>,
    },
    /// An unresolved value reached an operator or function.
    UnresolvedOperand {
        /// The operator symbol or function name that received it.
        name: String,
    },
    /// Integer division or remainder by zero.
    DivisionByZero,
    /// An integer operation overflowed.
    IntegerOverflow {
        /// The operator symbol or function name.
        operation: String,
    },
    /// A float cannot be converted to an integer.
    NotAnInteger {
        /// The float value.
        value: f32,
    },
    /// A string that should contain an integer does not.
    InvalidNumber {
        /// The string that failed to parse.
        text: String,
    },
    /// A registered extension rejected an action.
    ExtensionFailed {
        /// The rendered action arguments.
        arguments: String,
    },
    /// An error raised on purpose by the processed text.
    UserError {
        /// The message supplied by the text.
        message: String,
    },
}

impl std::fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Type mismatch: expected {} but found {}", self.expected, self.found)
    }
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariable { name } => write!(f, "Unknown variable: {name}"),
            Self::UnknownFunction { name } => write!(f, "Unknown function: {name}"),
            Self::WrongArgumentCount { name,
                                       expected,
                                       found, } => write!(f,
                                                          "Function {name} takes {expected} argument(s) but {found} were supplied"),
            Self::NoMatchingSignature { name, types } => {
                let types = types.iter()
                                 .map(ToString::to_string)
                                 .collect::<Vec<_>>()
                                 .join(", ");
                write!(f, "No matching signature for {name}({types})")
            },
            Self::UnresolvedOperand { name } => {
                write!(f, "Unresolved value used as an argument of {name}")
            },
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::IntegerOverflow { operation } => write!(f, "Integer overflow in {operation}"),
            Self::NotAnInteger { value } => {
                write!(f, "Float {value} cannot be converted to an integer")
            },
            Self::InvalidNumber { text } => write!(f, "Not an integer: '{text}'"),
            Self::ExtensionFailed { arguments } => {
                write!(f, "Action extension failed for arguments: {arguments}")
            },
            Self::UserError { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for TypeMismatch {}

impl std::error::Error for EvaluationError {}
