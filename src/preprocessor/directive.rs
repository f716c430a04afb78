use crate::{
    error::{ErrorKind, StructureError},
    expression::{
        item::ExpressionTree,
        parser::{parse_expression, parse_expression_list},
    },
    preprocessor::variables::is_variable_name,
};

/// The shape of the text a directive takes after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    /// Nothing may follow the name.
    None,
    /// A `+` or `-` directly after the name.
    OnOff,
    /// Exactly one expression.
    SingleExpression,
    /// A comma separated list of expressions.
    MultiExpression,
    /// Raw text, interpreted by the directive itself.
    FreeText,
}

/// The pass a directive acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The pre-scan of every file, before any output is produced.
    Global,
    /// The line by line pass that produces output.
    Line,
}

/// Every directive the preprocessor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Opens a block kept when its condition is true.
    If,
    /// Opens a block kept when a variable is defined.
    IfDef,
    /// Opens a block kept when a variable is not defined.
    IfNDef,
    /// An alternative branch of the current block.
    Elif,
    /// The last branch of the current block.
    Else,
    /// Closes the current block.
    EndIf,
    /// Opens a block for global pass directives (`_if`).
    GlobalIf,
    /// The last branch of the current global pass block (`_else`).
    GlobalElse,
    /// Closes the current global pass block (`_endif`).
    GlobalEndIf,
    /// Defines a global variable during the global pass.
    Global,
    /// Skips the file when its condition holds after the global pass.
    ExcludeIf,
    /// Defines a variable visible in the current file.
    Local,
    /// Defines a global variable, `true` when no expression is given.
    Define,
    /// Removes a local or global variable.
    Undef,
    /// Redirects output to the start of the file, or back.
    Prefix,
    /// Redirects output to the end of the file, or back.
    Postfix,
    /// Passes evaluated values to the action extension.
    Action,
    /// Logs an information message.
    Echo,
    /// Logs a warning.
    Warning,
    /// Stops with a user error.
    Error,
    /// Stops processing the current file.
    Exit,
    /// Stops processing the current file when its condition is true.
    ExitIf,
    /// Processes another file in place.
    Include,
}

impl Directive {
    /// All directives, in reference order.
    pub const ALL: &'static [Self] = &[Self::If,
                                       Self::IfDef,
                                       Self::IfNDef,
                                       Self::Elif,
                                       Self::Else,
                                       Self::EndIf,
                                       Self::GlobalIf,
                                       Self::GlobalElse,
                                       Self::GlobalEndIf,
                                       Self::Global,
                                       Self::ExcludeIf,
                                       Self::Local,
                                       Self::Define,
                                       Self::Undef,
                                       Self::Prefix,
                                       Self::Postfix,
                                       Self::Action,
                                       Self::Echo,
                                       Self::Warning,
                                       Self::Error,
                                       Self::Exit,
                                       Self::ExitIf,
                                       Self::Include];

    /// The keyword written after the directive prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::IfDef => "ifdef",
            Self::IfNDef => "ifndef",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::EndIf => "endif",
            Self::GlobalIf => "_if",
            Self::GlobalElse => "_else",
            Self::GlobalEndIf => "_endif",
            Self::Global => "global",
            Self::ExcludeIf => "excludeif",
            Self::Local => "local",
            Self::Define => "define",
            Self::Undef => "undef",
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::Action => "action",
            Self::Echo => "echo",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Exit => "exit",
            Self::ExitIf => "exitif",
            Self::Include => "include",
        }
    }

    /// A one line usage description.
    #[must_use]
    pub const fn reference(self) -> &'static str {
        match self {
            Self::If => "if BOOL_EXPR - open a block kept when the condition is true",
            Self::IfDef => "ifdef NAME - open a block kept when the variable is defined",
            Self::IfNDef => "ifndef NAME - open a block kept when the variable is not defined",
            Self::Elif => "elif BOOL_EXPR - alternative branch of the current block",
            Self::Else => "else - last branch of the current block",
            Self::EndIf => "endif - close the current block",
            Self::GlobalIf => "_if BOOL_EXPR - open a block for global pass directives",
            Self::GlobalElse => "_else - last branch of the current global pass block",
            Self::GlobalEndIf => "_endif - close the current global pass block",
            Self::Global => "global NAME=EXPR - define a global variable in the global pass",
            Self::ExcludeIf => "excludeif BOOL_EXPR - skip the file when true after the global pass",
            Self::Local => "local NAME=EXPR - define a variable visible in the current file",
            Self::Define => "define NAME [EXPR] - define a global variable, TRUE by default",
            Self::Undef => "undef NAME - remove a local or global variable",
            Self::Prefix => "prefix[+|-] - redirect output to the start of the file, or back",
            Self::Postfix => "postfix[+|-] - redirect output to the end of the file, or back",
            Self::Action => "action EXPR[,EXPR...] - pass values to the action extension",
            Self::Echo => "echo TEXT - log an information message",
            Self::Warning => "warning TEXT - log a warning",
            Self::Error => "error TEXT - stop with an error",
            Self::Exit => "exit - stop processing the current file",
            Self::ExitIf => "exitif BOOL_EXPR - stop processing the current file when true",
            Self::Include => "include STR_EXPR - process another file in place",
        }
    }

    /// The shape of the directive argument.
    #[must_use]
    pub const fn argument_type(self) -> ArgumentType {
        match self {
            Self::Else | Self::EndIf | Self::GlobalElse | Self::GlobalEndIf | Self::Exit => {
                ArgumentType::None
            },
            Self::Prefix | Self::Postfix => ArgumentType::OnOff,
            Self::If | Self::Elif | Self::GlobalIf | Self::ExcludeIf | Self::ExitIf | Self::Include => {
                ArgumentType::SingleExpression
            },
            Self::Action => ArgumentType::MultiExpression,
            Self::IfDef
            | Self::IfNDef
            | Self::Global
            | Self::Local
            | Self::Define
            | Self::Undef
            | Self::Echo
            | Self::Warning
            | Self::Error => ArgumentType::FreeText,
        }
    }

    /// The pass the directive acts in; it is consumed silently in the other.
    #[must_use]
    pub const fn pass(self) -> Pass {
        match self {
            Self::GlobalIf | Self::GlobalElse | Self::GlobalEndIf | Self::Global | Self::ExcludeIf => {
                Pass::Global
            },
            _ => Pass::Line,
        }
    }

    /// Tests whether the directive must run inside inactive blocks, which is
    /// the case for the block structure directives only.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self,
                 Self::If
                 | Self::IfDef
                 | Self::IfNDef
                 | Self::Elif
                 | Self::Else
                 | Self::EndIf
                 | Self::GlobalIf
                 | Self::GlobalElse
                 | Self::GlobalEndIf)
    }
}

/// The validated argument of a directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// No argument.
    None,
    /// `+` is `true`, `-` is `false`.
    Switch(bool),
    /// A single parsed expression.
    Expression(ExpressionTree),
    /// A parsed expression list.
    Expressions(Vec<ExpressionTree>),
    /// Trimmed raw text.
    Text(String),
}

/// Finds the directive named at the start of `text`, the text following the
/// directive prefix.
///
/// The longest matching name wins, provided what follows it fits the argument
/// type: an on/off directive takes its suffix directly, every other directive
/// needs the end of text or whitespace after its name.
///
/// # Returns
/// The directive and the text after its name.
///
/// # Example
/// ```
/// use commentpp::preprocessor::directive::{Directive, find_directive};
///
/// assert_eq!(find_directive("ifdef DEBUG"), Some((Directive::IfDef, " DEBUG")));
/// assert_eq!(find_directive("postfix+"), Some((Directive::Postfix, "+")));
/// assert_eq!(find_directive("iffy"), None);
/// ```
#[must_use]
pub fn find_directive(text: &str) -> Option<(Directive, &str)> {
    Directive::ALL.iter()
                  .filter_map(|directive| {
                      let rest = text.strip_prefix(directive.name())?;
                      let fits = directive.argument_type() == ArgumentType::OnOff
                                 || rest.is_empty()
                                 || rest.starts_with(char::is_whitespace);
                      fits.then_some((*directive, rest))
                  })
                  .max_by_key(|(directive, _)| directive.name().len())
}

/// Validates and parses the text after a directive name.
///
/// # Errors
/// Returns a `StructureError` when the text does not fit the argument type,
/// or the expression `ParseError` for malformed expressions.
///
/// # Example
/// ```
/// use commentpp::preprocessor::directive::{Argument, Directive, parse_argument};
///
/// assert_eq!(parse_argument(Directive::Postfix, "-").unwrap(), Argument::Switch(false));
/// assert!(parse_argument(Directive::Postfix, "").is_err());
/// assert!(parse_argument(Directive::EndIf, " extra").is_err());
/// ```
pub fn parse_argument(directive: Directive, text: &str) -> Result<Argument, ErrorKind> {
    match directive.argument_type() {
        ArgumentType::None => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(Argument::None)
            } else {
                Err(StructureError::UnexpectedArgument { directive: directive.name().to_string(),
                                                         text:      trimmed.to_string(), }.into())
            }
        },
        ArgumentType::OnOff => Ok(Argument::Switch(switch_argument(directive, text)?)),
        ArgumentType::SingleExpression => Ok(Argument::Expression(expression_argument(directive, text)?)),
        ArgumentType::MultiExpression => {
            Ok(Argument::Expressions(expression_list_argument(directive, text)?))
        },
        ArgumentType::FreeText => Ok(Argument::Text(text.trim().to_string())),
    }
}

/// Reads the `+` or `-` suffix of an on/off directive.
///
/// # Errors
/// Returns `StructureError::InvalidSwitch` for anything else.
pub fn switch_argument(directive: Directive, text: &str) -> Result<bool, StructureError> {
    match text.trim() {
        "+" => Ok(true),
        "-" => Ok(false),
        other => Err(StructureError::InvalidSwitch { directive: directive.name().to_string(),
                                                     suffix:    other.to_string(), }),
    }
}

/// Parses a single expression argument.
///
/// # Errors
/// Returns `StructureError::MissingArgument` for blank text and the
/// `ParseError` of the expression otherwise.
pub fn expression_argument(directive: Directive, text: &str) -> Result<ExpressionTree, ErrorKind> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StructureError::MissingArgument { directive: directive.name().to_string() }.into());
    }
    Ok(parse_expression(trimmed)?)
}

/// Parses a comma separated expression list argument.
///
/// # Errors
/// Returns `StructureError::MissingArgument` for blank text and the
/// `ParseError` of the list otherwise.
pub fn expression_list_argument(directive: Directive, text: &str) -> Result<Vec<ExpressionTree>, ErrorKind> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StructureError::MissingArgument { directive: directive.name().to_string() }.into());
    }
    Ok(parse_expression_list(trimmed)?)
}

/// Reads a variable name argument, normalized to lower case.
///
/// # Errors
/// Returns `StructureError::MissingArgument` for blank text and
/// `StructureError::UnexpectedArgument` if the text is not a single name.
pub fn variable_argument(directive: Directive, text: &str) -> Result<String, StructureError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StructureError::MissingArgument { directive: directive.name().to_string() });
    }
    if !is_variable_name(trimmed) {
        return Err(StructureError::UnexpectedArgument { directive: directive.name().to_string(),
                                                        text:      trimmed.to_string(), });
    }
    Ok(trimmed.to_lowercase())
}

/// Splits a `name=expression` argument into the lowercased name and the
/// expression text.
///
/// The expression is returned as a suffix of `text` with its leading
/// whitespace removed, so callers can locate it within the argument.
///
/// # Errors
/// Returns `StructureError::MalformedAssignment` if there is no `=` or the
/// text before it is not a variable name.
///
/// # Example
/// ```
/// use commentpp::preprocessor::directive::{Directive, split_assignment};
///
/// let (name, expression) = split_assignment(Directive::Local, " Level = 1 + 2").unwrap();
/// assert_eq!(name, "level");
/// assert_eq!(expression, "1 + 2");
/// ```
pub fn split_assignment(directive: Directive, text: &str) -> Result<(String, &str), StructureError> {
    let malformed = || StructureError::MalformedAssignment { directive: directive.name().to_string(),
                                                             text:      text.trim().to_string(), };

    let (name, expression) = text.split_once('=').ok_or_else(malformed)?;
    let name = name.trim();
    if !is_variable_name(name) {
        return Err(malformed());
    }
    Ok((name.to_lowercase(), expression.trim_start()))
}
