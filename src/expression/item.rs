use crate::expression::value::Value;

/// Priority tiers used while parsing, from the loosest to the tightest
/// binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// `&&`, `||`, `^`
    Logical,
    /// `==`, `!=`, `<`, `>`, `<=`, `>=`
    Comparison,
    /// `+`, `-`
    Additive,
    /// `*`, `/`, `%`
    Multiplicative,
    /// `!` and unary `-`
    Unary,
    /// Literals, variables, function calls and parenthesized expressions.
    Value,
}

/// The operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Addition or string concatenation.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Mod,
    /// Equality.
    Equal,
    /// Inequality.
    NotEqual,
    /// Less than.
    Less,
    /// Greater than.
    Greater,
    /// Less than or equal.
    LessEqual,
    /// Greater than or equal.
    GreaterEqual,
    /// Logical or bitwise and.
    And,
    /// Logical or bitwise or.
    Or,
    /// Logical or bitwise exclusive or.
    Xor,
    /// Logical negation or bitwise complement.
    Not,
    /// Arithmetic negation.
    Negate,
}

impl Operator {
    /// Returns the source symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub | Self::Negate => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Xor => "^",
            Self::Not => "!",
        }
    }

    /// Returns the priority tier of the operator.
    #[must_use]
    pub const fn priority(self) -> Priority {
        match self {
            Self::And | Self::Or | Self::Xor => Priority::Logical,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::Greater
            | Self::LessEqual
            | Self::GreaterEqual => Priority::Comparison,
            Self::Add | Self::Sub => Priority::Additive,
            Self::Mul | Self::Div | Self::Mod => Priority::Multiplicative,
            Self::Not | Self::Negate => Priority::Unary,
        }
    }

    /// Returns the number of operands the operator takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Not | Self::Negate => 1,
            _ => 2,
        }
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionItem {
    /// A literal value.
    Value(Value),
    /// A variable reference. The name is already normalized to lower case.
    Variable {
        /// Variable name.
        name:   String,
        /// Column of the reference in the expression text.
        column: usize,
    },
    /// A function call.
    Function {
        /// Function name, normalized to lower case.
        name:      String,
        /// Argument sub-trees in call order.
        arguments: Vec<Self>,
        /// Column of the name in the expression text.
        column:    usize,
    },
    /// An operator applied to one or two operands.
    Operator {
        /// The operator.
        operator: Operator,
        /// Operands in evaluation order.
        operands: Vec<Self>,
        /// Column of the operator in the expression text.
        column:   usize,
    },
}

impl ExpressionItem {
    /// Returns the priority tier of the item.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        match self {
            Self::Operator { operator, .. } => operator.priority(),
            Self::Value(_) | Self::Variable { .. } | Self::Function { .. } => Priority::Value,
        }
    }
}

/// A parsed expression together with the text it was parsed from.
///
/// Trees are built fresh for every expression and never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    /// The root item.
    pub root:   ExpressionItem,
    /// The expression text.
    pub source: String,
}

impl std::fmt::Display for ExpressionItem {
    /// Renders the item as expression text with only the parentheses its
    /// priorities require.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value.to_literal()),
            Self::Variable { name, .. } => write!(f, "{name}"),
            Self::Function { name, arguments, .. } => {
                write!(f, "{name}(")?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            },
            Self::Operator { operator, operands, .. } => match operands.as_slice() {
                [operand] if operand.priority() < Priority::Unary => {
                    write!(f, "{}({operand})", operator.symbol())
                },
                [operand] => write!(f, "{}{operand}", operator.symbol()),
                [left, right] => {
                    let priority = operator.priority();
                    if left.priority() < priority {
                        write!(f, "({left})")?;
                    } else {
                        write!(f, "{left}")?;
                    }
                    write!(f, " {} ", operator.symbol())?;
                    if right.priority() <= priority {
                        write!(f, "({right})")
                    } else {
                        write!(f, "{right}")
                    }
                },
                _ => Err(std::fmt::Error),
            },
        }
    }
}

impl std::fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
