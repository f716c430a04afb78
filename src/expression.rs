/// Evaluates expression trees.
///
/// Walks a parsed tree strictly left to right, resolving variables through an
/// [`evaluator::ExpressionContext`] and dispatching operators and functions by
/// the runtime types of their arguments.
pub mod evaluator;
/// The builtin function registry.
///
/// Declares every function callable from an expression together with the
/// argument type signatures it accepts: numeric helpers such as `abs` and
/// `round`, string helpers such as `str2int`, `strlen` and `issubstr`, and
/// escaping helpers for web, XML, CSV, JavaScript and Java output.
pub mod function;
/// Expression tree nodes and operator priorities.
pub mod item;
/// The lexer module tokenizes expression text.
///
/// Converts directive arguments into typed tokens (numeric, string and boolean
/// literals, identifiers, operators and punctuation), each with its column,
/// and offers a reader with one token of push-back for the parser.
pub mod lexer;
/// The operator registry.
///
/// Maps every operator to its ordered list of type signatures and rules:
/// checked integer arithmetic, float arithmetic with checked promotion,
/// string concatenation, comparisons, and logical or bitwise combinators.
pub mod operator;
/// The parser module builds expression trees from tokens.
///
/// Uses one function per priority tier, each left associative, and reports
/// the delimiter that ended an expression so comma separated lists can be
/// read one expression at a time.
pub mod parser;
/// Signature matching shared by operators and functions.
pub mod signature;
/// The value model: the five value types, their projections and formatting.
pub mod value;
