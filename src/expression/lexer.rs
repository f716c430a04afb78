use logos::Logos;

use crate::error::{LexError, LexErrorKind};

/// Result type used by the tokenizer.
pub type LexResult<T> = Result<T, LexError>;

/// A numeric literal as read from the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    /// Decimal or `0x` hexadecimal integer.
    Integer(i64),
    /// Literal with a fraction or an exponent.
    Float(f32),
}

/// Represents a lexical token of the expression language.
///
/// Signs are never part of a numeric literal; `-1` is the unary minus
/// operator applied to `1`.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// Numeric literal tokens, such as `42`, `0x1F`, `3.14`, `.5` or `2.5e-3`.
    #[regex(r"0[xX][0-9a-fA-F]*", lex_number)]
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", lex_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", lex_number)]
    Number(NumberLiteral),
    /// Quoted string literal tokens; the value is already unescaped.
    #[token("\"", lex_string)]
    Str(String),
    /// Boolean literal tokens, such as `true`.
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),
    /// Identifier tokens; variable or function names such as `debug` or
    /// `str2int`.
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `^`
    #[token("^")]
    Caret,
    /// `!`
    #[token("!")]
    Bang,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(NumberLiteral::Integer(v)) => write!(f, "{v}"),
            Self::Number(NumberLiteral::Float(v)) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "\"{v}\""),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::EqualEqual => write!(f, "=="),
            Self::BangEqual => write!(f, "!="),
            Self::LessEqual => write!(f, "<="),
            Self::GreaterEqual => write!(f, ">="),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::Caret => write!(f, "^"),
            Self::Bang => write!(f, "!"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
        }
    }
}

/// Finishes a numeric literal.
///
/// A literal directly followed by identifier characters is malformed as a
/// whole, so those characters are consumed into the error fragment.
///
/// # Returns
/// - `Ok(NumberLiteral)`: The integer or float value.
/// - `Err(LexErrorKind::MalformedNumber)`: Trailing letters, a hex prefix with
///   no digits, or an unparsable float.
/// - `Err(LexErrorKind::IntegerOverflow)`: The integer does not fit in `i64`.
fn lex_number(lex: &mut logos::Lexer<Token>) -> Result<NumberLiteral, LexErrorKind> {
    let trailing = lex.remainder()
                      .chars()
                      .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$'))
                      .map(char::len_utf8)
                      .sum::<usize>();
    if trailing > 0 {
        lex.bump(trailing);
        return Err(LexErrorKind::MalformedNumber);
    }

    let text = lex.slice();
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if digits.is_empty() {
            return Err(LexErrorKind::MalformedNumber);
        }
        return i64::from_str_radix(digits, 16).map(NumberLiteral::Integer)
                                              .map_err(|_| LexErrorKind::IntegerOverflow);
    }
    if text.contains(['.', 'e', 'E']) {
        return text.parse()
                   .map(NumberLiteral::Float)
                   .map_err(|_| LexErrorKind::MalformedNumber);
    }
    text.parse()
        .map(NumberLiteral::Integer)
        .map_err(|_| LexErrorKind::IntegerOverflow)
}

/// Reads the body of a string literal after its opening quote.
///
/// Supports the escapes `\n \t \r \b \f \\ \" \'` and `\uXXXX`.
fn lex_string(lex: &mut logos::Lexer<Token>) -> Result<String, LexErrorKind> {
    let remainder = lex.remainder();
    let mut value = String::new();
    let mut chars = remainder.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => {
                lex.bump(offset + 1);
                return Ok(value);
            },
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                let decoded = match escaped {
                    'n' => Some('\n'),
                    't' => Some('\t'),
                    'r' => Some('\r'),
                    'b' => Some('\u{8}'),
                    'f' => Some('\u{c}'),
                    '\\' | '"' | '\'' => Some(escaped),
                    'u' => {
                        let hex = chars.by_ref().take(4).map(|(_, c)| c).collect::<String>();
                        u32::from_str_radix(&hex, 16).ok()
                                                     .filter(|_| hex.len() == 4)
                                                     .and_then(char::from_u32)
                    },
                    _ => None,
                };
                if let Some(c) = decoded {
                    value.push(c);
                } else {
                    let consumed = chars.next().map_or(remainder.len(), |(end, _)| end);
                    lex.bump(consumed);
                    return Err(LexErrorKind::UnknownEscape);
                }
            },
            other => value.push(other),
        }
    }

    lex.bump(remainder.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Converts a byte offset into a 1-based character column.
fn column_at(source: &str, offset: usize) -> usize {
    source[..offset].chars().count() + 1
}

/// Tokenizes expression text.
///
/// Each token is paired with its 1-based column. Tokenizing stops at the
/// first invalid fragment.
///
/// # Example
/// ```
/// use commentpp::expression::lexer::{NumberLiteral, Token, tokenize};
///
/// let tokens = tokenize("a <= 0x10").unwrap();
/// assert_eq!(tokens,
///            vec![(Token::Identifier("a".into()), 1),
///                 (Token::LessEqual, 3),
///                 (Token::Number(NumberLiteral::Integer(16)), 6)]);
///
/// assert!(tokenize("12ab").is_err());
/// ```
pub fn tokenize(source: &str) -> LexResult<Vec<(Token, usize)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let column = column_at(source, lexer.span().start);
        match result {
            Ok(token) => tokens.push((token, column)),
            Err(kind) => return Err(LexError::new(kind, lexer.slice(), column)),
        }
    }

    Ok(tokens)
}

/// A cursor over tokens with one token of push-back.
///
/// The parser reads tokens one at a time and returns the last one when it
/// turns out to belong to the caller, such as a closing parenthesis or a
/// comma that ends a list item.
pub struct TokenReader<'a> {
    tokens:     &'a [(Token, usize)],
    position:   usize,
    end_column: usize,
}

impl<'a> TokenReader<'a> {
    /// Creates a reader over `tokens`. `end_column` is reported for errors at
    /// the end of the input.
    #[must_use]
    pub const fn new(tokens: &'a [(Token, usize)], end_column: usize) -> Self {
        Self { tokens,
               position: 0,
               end_column }
    }

    /// Returns the next token and its column.
    pub fn read(&mut self) -> Option<&'a (Token, usize)> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Returns the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a (Token, usize)> {
        self.tokens.get(self.position)
    }

    /// Un-reads the token returned by the last call to [`Self::read`].
    pub const fn unread(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Column of the next token, or the end column when input is exhausted.
    #[must_use]
    pub fn column(&self) -> usize {
        self.peek().map_or(self.end_column, |(_, column)| *column)
    }
}
