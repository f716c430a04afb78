use crate::error::LexError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while turning expression text into an
/// expression tree.
pub enum ParseError {
    /// The text could not be tokenized.
    Lex(LexError),
    /// Found a token where it is not allowed.
    UnexpectedToken {
        /// The token encountered.
        token:  String,
        /// The column where the error occurred.
        column: usize,
    },
    /// An operator is missing its right hand operand.
    MissingOperand {
        /// The column where the operand was expected.
        column: usize,
    },
    /// An opening parenthesis without its closing one, or the other way
    /// around.
    UnbalancedParenthesis {
        /// The column where the error occurred.
        column: usize,
    },
    /// Nothing between two commas, or a comma with nothing after it.
    EmptyArgument {
        /// The column of the comma or closing parenthesis.
        column: usize,
    },
    /// An expression with no content at all.
    EmptyExpression {
        /// The column where an expression was expected.
        column: usize,
    },
    /// A top level comma where exactly one expression is expected.
    UnexpectedComma {
        /// The column of the comma.
        column: usize,
    },
}

impl ParseError {
    /// Returns the 1-based column the error refers to.
    #[must_use]
    pub const fn column(&self) -> usize {
        match self {
            Self::Lex(error) => error.column,
            Self::UnexpectedToken { column, .. }
            | Self::MissingOperand { column }
            | Self::UnbalancedParenthesis { column }
            | Self::EmptyArgument { column }
            | Self::EmptyExpression { column }
            | Self::UnexpectedComma { column } => *column,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self::Lex(error)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(error) => write!(f, "{error}"),
            Self::UnexpectedToken { token, column } => {
                write!(f, "Unexpected token at column {column}: {token}")
            },
            Self::MissingOperand { column } => write!(f, "Missing operand at column {column}"),
            Self::UnbalancedParenthesis { column } => {
                write!(f, "Unbalanced parenthesis at column {column}")
            },
            Self::EmptyArgument { column } => write!(f, "Empty argument at column {column}"),
            Self::EmptyExpression { column } => {
                write!(f, "Expected an expression at column {column}")
            },
            Self::UnexpectedComma { column } => {
                write!(f, "Unexpected comma at column {column}, only one expression is allowed")
            },
        }
    }
}

impl std::error::Error for ParseError {}
