use crate::{
    error::ParseError,
    expression::{
        item::{ExpressionItem, ExpressionTree, Operator, Priority},
        lexer::{NumberLiteral, Token, TokenReader, tokenize},
        value::Value,
    },
};

/// Result type used by the parser.
///
/// All parsing functions return either a value of type `T` or a `ParseError`
/// describing the failure.
pub type ParseResult<T> = Result<T, ParseError>;

/// The token that ended an expression.
///
/// List contexts such as function arguments and `action` directives keep
/// reading while the delimiter is a comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// End of the input.
    End {
        /// Column just past the input.
        column: usize,
    },
    /// A top level comma, already consumed.
    Comma {
        /// Column of the comma.
        column: usize,
    },
    /// A `)` with no matching `(` in this expression, already consumed.
    CloseParen {
        /// Column of the parenthesis.
        column: usize,
    },
}

/// Parses text that must contain exactly one expression.
///
/// # Errors
/// Returns a `ParseError` for lexical errors, empty text, a top level comma,
/// unbalanced parentheses or any other syntax error.
///
/// # Example
/// ```
/// use commentpp::expression::parser::parse_expression;
///
/// let tree = parse_expression("(1 + 2) * x").unwrap();
/// assert_eq!(tree.to_string(), "(1 + 2) * x");
///
/// assert!(parse_expression("1, 2").is_err());
/// ```
pub fn parse_expression(source: &str) -> ParseResult<ExpressionTree> {
    let tokens = tokenize(source)?;
    let mut reader = TokenReader::new(&tokens, source.chars().count() + 1);

    match read_expression(&mut reader)? {
        (Some(root), Delimiter::End { .. }) => Ok(ExpressionTree { root,
                                                                   source: source.to_string() }),
        (None, Delimiter::End { column }) => Err(ParseError::EmptyExpression { column }),
        (_, Delimiter::Comma { column }) => Err(ParseError::UnexpectedComma { column }),
        (_, Delimiter::CloseParen { column }) => Err(ParseError::UnbalancedParenthesis { column }),
    }
}

/// Parses text holding a comma separated list of expressions.
///
/// Every sub-expression gets its own tree; the source of each tree is the
/// whole list text.
///
/// # Errors
/// Returns `ParseError::EmptyArgument` for an empty item or dangling comma,
/// `ParseError::EmptyExpression` for empty text, and any error of the
/// individual expressions.
///
/// # Example
/// ```
/// use commentpp::{error::ParseError, expression::parser::parse_expression_list};
///
/// assert_eq!(parse_expression_list("1, \"a\", x").unwrap().len(), 3);
/// assert!(matches!(parse_expression_list("1,,2"),
///                  Err(ParseError::EmptyArgument { column: 3 })));
/// ```
pub fn parse_expression_list(source: &str) -> ParseResult<Vec<ExpressionTree>> {
    let tokens = tokenize(source)?;
    let mut reader = TokenReader::new(&tokens, source.chars().count() + 1);
    let mut trees = Vec::new();

    loop {
        match read_expression(&mut reader)? {
            (Some(root), Delimiter::Comma { .. }) => {
                trees.push(ExpressionTree { root,
                                            source: source.to_string() });
            },
            (Some(root), Delimiter::End { .. }) => {
                trees.push(ExpressionTree { root,
                                            source: source.to_string() });
                return Ok(trees);
            },
            (None, Delimiter::End { column }) if trees.is_empty() => {
                return Err(ParseError::EmptyExpression { column });
            },
            (None, Delimiter::End { column } | Delimiter::Comma { column }) => {
                return Err(ParseError::EmptyArgument { column });
            },
            (_, Delimiter::CloseParen { column }) => {
                return Err(ParseError::UnbalancedParenthesis { column });
            },
        }
    }
}

/// Reads one expression and the delimiter that ended it.
///
/// Parsing stops at the end of input, at an unmatched `)` or at a top level
/// comma; the last two are consumed and reported so list contexts can loop.
/// An expression with nothing before its delimiter yields `None`.
///
/// # Errors
/// Returns a `ParseError` if the tokens before the delimiter are not a valid
/// expression, or if they are followed by something other than a delimiter.
pub fn read_expression(reader: &mut TokenReader) -> ParseResult<(Option<ExpressionItem>, Delimiter)> {
    if let Some(delimiter) = read_delimiter(reader) {
        return Ok((None, delimiter));
    }

    let item = parse_logical(reader)?;
    if let Some(delimiter) = read_delimiter(reader) {
        return Ok((Some(item), delimiter));
    }

    let column = reader.column();
    let token = reader.peek().map_or_else(String::new, |(token, _)| token.to_string());
    Err(ParseError::UnexpectedToken { token, column })
}

/// Consumes and returns the next token if it is a delimiter.
fn read_delimiter(reader: &mut TokenReader) -> Option<Delimiter> {
    let column = reader.column();
    match reader.read() {
        None => Some(Delimiter::End { column }),
        Some((Token::Comma, _)) => Some(Delimiter::Comma { column }),
        Some((Token::RParen, _)) => Some(Delimiter::CloseParen { column }),
        Some(_) => {
            reader.unread();
            None
        },
    }
}

/// Maps a token to the binary operator it denotes.
const fn binary_operator(token: &Token) -> Option<Operator> {
    match token {
        Token::Plus => Some(Operator::Add),
        Token::Minus => Some(Operator::Sub),
        Token::Star => Some(Operator::Mul),
        Token::Slash => Some(Operator::Div),
        Token::Percent => Some(Operator::Mod),
        Token::EqualEqual => Some(Operator::Equal),
        Token::BangEqual => Some(Operator::NotEqual),
        Token::Less => Some(Operator::Less),
        Token::Greater => Some(Operator::Greater),
        Token::LessEqual => Some(Operator::LessEqual),
        Token::GreaterEqual => Some(Operator::GreaterEqual),
        Token::AndAnd => Some(Operator::And),
        Token::OrOr => Some(Operator::Or),
        Token::Caret => Some(Operator::Xor),
        _ => None,
    }
}

/// Parses a left associative chain of binary operators of one tier.
///
/// The rule is: `tier := operand (operator-of-tier operand)*`
///
/// # Parameters
/// - `reader`: Token reader.
/// - `tier`: The priority every accepted operator must have.
/// - `parse_operand`: Parser for the next tighter tier.
fn parse_left_associative(reader: &mut TokenReader,
                          tier: Priority,
                          parse_operand: fn(&mut TokenReader) -> ParseResult<ExpressionItem>)
                          -> ParseResult<ExpressionItem> {
    let mut left = parse_operand(reader)?;
    while let Some((token, column)) = reader.peek()
          && let Some(operator) = binary_operator(token)
          && operator.priority() == tier
    {
        reader.read();
        let right = parse_operand(reader)?;
        left = ExpressionItem::Operator { operator,
                                          operands: vec![left, right],
                                          column: *column };
    }
    Ok(left)
}

/// Parses `&&`, `||` and `^`, which share the loosest tier.
fn parse_logical(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    parse_left_associative(reader, Priority::Logical, parse_comparison)
}

/// Parses `==`, `!=`, `<`, `>`, `<=` and `>=`.
fn parse_comparison(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    parse_left_associative(reader, Priority::Comparison, parse_additive)
}

/// Parses addition and subtraction.
fn parse_additive(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    parse_left_associative(reader, Priority::Additive, parse_multiplicative)
}

/// Parses multiplication, division and remainder.
fn parse_multiplicative(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    parse_left_associative(reader, Priority::Multiplicative, parse_unary)
}

/// Parses prefix `!` and `-`, which bind tighter than every binary operator.
fn parse_unary(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    let operator = match reader.peek() {
        Some((Token::Bang, _)) => Operator::Not,
        Some((Token::Minus, _)) => Operator::Negate,
        _ => return parse_primary(reader),
    };
    let column = reader.column();
    reader.read();
    let operand = parse_unary(reader)?;
    Ok(ExpressionItem::Operator { operator,
                                  operands: vec![operand],
                                  column })
}

/// Parses literals, variables, function calls and parenthesized expressions.
///
/// # Errors
/// Returns `ParseError::MissingOperand` when a delimiter or the end of input
/// appears where an operand is required, and `ParseError::UnexpectedToken`
/// for operators in operand position.
fn parse_primary(reader: &mut TokenReader) -> ParseResult<ExpressionItem> {
    let column = reader.column();
    let Some((token, _)) = reader.read() else {
        return Err(ParseError::MissingOperand { column });
    };

    match token {
        Token::Number(NumberLiteral::Integer(v)) => Ok(ExpressionItem::Value(Value::Int(*v))),
        Token::Number(NumberLiteral::Float(v)) => Ok(ExpressionItem::Value(Value::Float(*v))),
        Token::Str(v) => Ok(ExpressionItem::Value(Value::Str(v.clone()))),
        Token::Bool(v) => Ok(ExpressionItem::Value(Value::Bool(*v))),
        Token::Identifier(name) => {
            let name = name.to_lowercase();
            if let Some((Token::LParen, _)) = reader.peek() {
                reader.read();
                let arguments = parse_arguments(reader, column)?;
                return Ok(ExpressionItem::Function { name,
                                                     arguments,
                                                     column });
            }
            Ok(ExpressionItem::Variable { name, column })
        },
        Token::LParen => match read_expression(reader)? {
            (Some(item), Delimiter::CloseParen { .. }) => Ok(item),
            (None, Delimiter::CloseParen { column }) => {
                Err(ParseError::EmptyExpression { column })
            },
            (_, Delimiter::Comma { column }) => Err(ParseError::UnexpectedComma { column }),
            (_, Delimiter::End { .. }) => Err(ParseError::UnbalancedParenthesis { column }),
        },
        Token::Comma | Token::RParen => Err(ParseError::MissingOperand { column }),
        other => Err(ParseError::UnexpectedToken { token: other.to_string(),
                                                   column }),
    }
}

/// Parses the arguments of a call after its opening parenthesis.
///
/// The grammar is: `arguments := ")" | expression ("," expression)* ")"`
fn parse_arguments(reader: &mut TokenReader, call_column: usize) -> ParseResult<Vec<ExpressionItem>> {
    let mut arguments = Vec::new();

    loop {
        match read_expression(reader)? {
            (Some(item), Delimiter::Comma { .. }) => arguments.push(item),
            (Some(item), Delimiter::CloseParen { .. }) => {
                arguments.push(item);
                return Ok(arguments);
            },
            (None, Delimiter::CloseParen { .. }) if arguments.is_empty() => return Ok(arguments),
            (None, Delimiter::Comma { column } | Delimiter::CloseParen { column }) => {
                return Err(ParseError::EmptyArgument { column });
            },
            (_, Delimiter::End { .. }) => {
                return Err(ParseError::UnbalancedParenthesis { column: call_column });
            },
        }
    }
}
