use std::path::{Path, PathBuf};

use crate::error::{EvaluationError, LexError, ParseError, StructureError, TypeMismatch};

#[derive(Debug, Clone, PartialEq)]
/// Any failure of the expression engine: tokenizing, parsing or evaluating.
pub enum ExpressionError {
    /// The text could not be tokenized.
    Lex(LexError),
    /// The tokens do not form an expression.
    Parse(ParseError),
    /// A value could not be projected to a required type.
    Type(TypeMismatch),
    /// Evaluation failed.
    Evaluation(EvaluationError),
}

impl ExpressionError {
    /// Returns the 1-based column inside the expression text, if the error
    /// was raised before evaluation started.
    #[must_use]
    pub const fn column(&self) -> Option<usize> {
        match self {
            Self::Lex(error) => Some(error.column),
            Self::Parse(error) => Some(error.column()),
            Self::Type(_) | Self::Evaluation(_) => None,
        }
    }
}

impl From<LexError> for ExpressionError {
    fn from(error: LexError) -> Self {
        Self::Lex(error)
    }
}

impl From<ParseError> for ExpressionError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Lex(error) => Self::Lex(error),
            other => Self::Parse(other),
        }
    }
}

impl From<TypeMismatch> for ExpressionError {
    fn from(error: TypeMismatch) -> Self {
        Self::Type(error)
    }
}

impl From<EvaluationError> for ExpressionError {
    fn from(error: EvaluationError) -> Self {
        Self::Evaluation(error)
    }
}

impl std::fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(error) => write!(f, "{error}"),
            Self::Parse(error) => write!(f, "{error}"),
            Self::Type(error) => write!(f, "{error}"),
            Self::Evaluation(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ExpressionError {}

#[derive(Debug)]
/// The failure category of a [`PreprocessError`].
pub enum ErrorKind {
    /// An expression failed to tokenize, parse or evaluate.
    Expression(ExpressionError),
    /// Directive misuse or unbalanced blocks.
    Structure(StructureError),
    /// A configuration file or command line definition is invalid.
    Config {
        /// Details about the problem.
        message: String,
    },
    /// Reading or writing a file failed.
    Io(std::io::Error),
}

impl From<ExpressionError> for ErrorKind {
    fn from(error: ExpressionError) -> Self {
        Self::Expression(error)
    }
}

impl From<ParseError> for ErrorKind {
    fn from(error: ParseError) -> Self {
        Self::Expression(error.into())
    }
}

impl From<TypeMismatch> for ErrorKind {
    fn from(error: TypeMismatch) -> Self {
        Self::Expression(error.into())
    }
}

impl From<EvaluationError> for ErrorKind {
    fn from(error: EvaluationError) -> Self {
        Self::Expression(error.into())
    }
}

impl From<StructureError> for ErrorKind {
    fn from(error: StructureError) -> Self {
        Self::Structure(error)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expression(error) => write!(f, "{error}"),
            Self::Structure(error) => write!(f, "{error}"),
            Self::Config { message } => write!(f, "{message}"),
            Self::Io(error) => write!(f, "I/O error: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A line inside a file, used for diagnostics and include stacks.
pub struct FilePosition {
    /// The file path.
    pub file: PathBuf,
    /// The 1-based line number.
    pub line: usize,
}

impl std::fmt::Display for FilePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

#[derive(Debug)]
/// A fatal error of a preprocessing run together with where it happened.
///
/// Every failure aborts the run; the first one is reported through this type.
pub struct PreprocessError {
    /// What went wrong.
    pub kind:          ErrorKind,
    /// The file being processed, when the failure belongs to one.
    pub file:          Option<PathBuf>,
    /// The 1-based line, when the failure belongs to one.
    pub line:          Option<usize>,
    /// The 1-based column, when known.
    pub column:        Option<usize>,
    /// The offending source text.
    pub fragment:      Option<String>,
    /// The `include` directives that led to the file, outermost first.
    pub include_stack: Vec<FilePosition>,
}

impl PreprocessError {
    /// Creates an error that is not tied to any file.
    #[must_use]
    pub fn new(kind: impl Into<ErrorKind>) -> Self {
        Self { kind:          kind.into(),
               file:          None,
               line:          None,
               column:        None,
               fragment:      None,
               include_stack: Vec::new(), }
    }

    /// Creates an error that belongs to a whole file, such as a failed read.
    #[must_use]
    pub fn in_file(kind: impl Into<ErrorKind>, file: &Path) -> Self {
        Self { file: Some(file.to_path_buf()),
               ..Self::new(kind) }
    }

    /// Creates an error at a line of a file.
    #[must_use]
    pub fn at(kind: impl Into<ErrorKind>, file: &Path, line: usize) -> Self {
        Self { line: Some(line),
               ..Self::in_file(kind, file) }
    }

    /// Attaches the column.
    #[must_use]
    pub const fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attaches the offending source text.
    #[must_use]
    pub fn with_fragment(mut self, fragment: &str) -> Self {
        self.fragment = Some(fragment.to_string());
        self
    }

    /// Attaches the include stack.
    #[must_use]
    pub fn with_include_stack(mut self, include_stack: &[FilePosition]) -> Self {
        self.include_stack = include_stack.to_vec();
        self
    }
}

impl std::fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error")?;
        if let Some(file) = &self.file {
            write!(f, " in {}", file.display())?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
            }
        }
        write!(f, ": {}", self.kind)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "\n  --> {fragment}")?;
        }
        for position in self.include_stack.iter().rev() {
            write!(f, "\n  included from {position}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PreprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Expression(error) => Some(error),
            ErrorKind::Structure(error) => Some(error),
            ErrorKind::Io(error) => Some(error),
            ErrorKind::Config { .. } => None,
        }
    }
}
