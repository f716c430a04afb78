/// Expression evaluation errors.
///
/// Contains the errors raised while evaluating an expression tree: type
/// mismatches when a value cannot be projected to a required type, and every
/// other evaluation failure such as unknown variables, signature mismatches,
/// division by zero or integer overflow.
pub mod evaluation_error;
/// Tokenization errors.
///
/// Defines the errors the lexer reports for text that does not form valid
/// tokens: unterminated strings, malformed numbers and stray characters.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all errors that can occur while building an expression tree from
/// tokens, such as unbalanced parentheses, missing operands or empty arguments.
pub mod parse_error;
/// Run level errors.
///
/// Wraps every error family into the single error a preprocessing run reports,
/// carrying the file, line, column, offending text and include stack.
pub mod preprocess_error;
/// Directive structure errors.
pub mod structure_error;

pub use evaluation_error::{EvaluationError, TypeMismatch};
pub use lex_error::{LexError, LexErrorKind};
pub use parse_error::ParseError;
pub use preprocess_error::{ErrorKind, ExpressionError, FilePosition, PreprocessError};
pub use structure_error::StructureError;
