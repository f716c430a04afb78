/// The reason a fragment of expression text could not be tokenized.
///
/// This is the error type the lexer itself produces; [`LexError`] attaches the
/// offending fragment and its column once tokenization stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    /// A character that does not start any token.
    #[default]
    UnexpectedCharacter,
    /// A string literal without its closing quote.
    UnterminatedString,
    /// A backslash escape that is not recognized inside a string literal.
    UnknownEscape,
    /// A numeric literal followed by letters or missing its digits, such as
    /// `12ab` or `0x`.
    MalformedNumber,
    /// An integer literal that does not fit into a signed 64 bit integer.
    IntegerOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A tokenization failure with the fragment and column it was found at.
pub struct LexError {
    /// What went wrong.
    pub kind:     LexErrorKind,
    /// The source text the lexer was looking at.
    pub fragment: String,
    /// The 1-based column of the fragment inside the expression text.
    pub column:   usize,
}

impl LexError {
    /// Creates a new lexer error.
    #[must_use]
    pub fn new(kind: LexErrorKind, fragment: &str, column: usize) -> Self {
        Self { kind,
               fragment: fragment.to_string(),
               column }
    }
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter => write!(f, "Unexpected character"),
            Self::UnterminatedString => write!(f, "Unterminated string literal"),
            Self::UnknownEscape => write!(f, "Unknown escape sequence in string literal"),
            Self::MalformedNumber => write!(f, "Malformed numeric literal"),
            Self::IntegerOverflow => write!(f, "Integer literal is too large"),
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at column {}: {}", self.kind, self.column, self.fragment)
    }
}

impl std::error::Error for LexError {}
