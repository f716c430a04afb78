#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents misuse of the directive syntax and unbalanced conditional
/// blocks.
pub enum StructureError {
    /// A directive line whose keyword is not registered.
    UnknownDirective {
        /// The text following the directive prefix.
        text: String,
    },
    /// A directive that takes no argument was given one.
    UnexpectedArgument {
        /// The directive name.
        directive: String,
        /// The trailing text.
        text:      String,
    },
    /// A directive that requires an argument was given none.
    MissingArgument {
        /// The directive name.
        directive: String,
    },
    /// An on/off directive with a suffix other than `+` or `-`.
    InvalidSwitch {
        /// The directive name.
        directive: String,
        /// The suffix that was found.
        suffix:    String,
    },
    /// A `name=expression` argument that does not name a variable.
    MalformedAssignment {
        /// The directive name.
        directive: String,
        /// The argument text.
        text:      String,
    },
    /// `elif`, `else` or `endif` without an open block.
    WithoutIf {
        /// The directive name.
        directive: String,
    },
    /// `elif` or `else` after the block already had its `else`.
    AfterElse {
        /// The directive name.
        directive: String,
    },
    /// A block still open when its file or include ends.
    UnclosedBlock {
        /// The directive that opened the block.
        directive: String,
        /// The line the block was opened on.
        line:      usize,
    },
    /// A file includes itself, directly or through other includes.
    IncludeCycle {
        /// The file that would be included again.
        path: String,
    },
}

impl std::fmt::Display for StructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDirective { text } => write!(f, "Unknown directive: {text}"),
            Self::UnexpectedArgument { directive, text } => {
                write!(f, "Directive {directive} takes no argument but found: {text}")
            },
            Self::MissingArgument { directive } => {
                write!(f, "Directive {directive} needs an argument")
            },
            Self::InvalidSwitch { directive, suffix } => {
                write!(f, "Directive {directive} needs ending [+|-] but found '{suffix}'")
            },
            Self::MalformedAssignment { directive, text } => {
                write!(f, "Directive {directive} expects name=expression but found: {text}")
            },
            Self::WithoutIf { directive } => write!(f, "Found {directive} without if"),
            Self::AfterElse { directive } => write!(f, "Found {directive} after else"),
            Self::UnclosedBlock { directive, line } => {
                write!(f, "Block opened by {directive} on line {line} is never closed")
            },
            Self::IncludeCycle { path } => write!(f, "Include cycle through {path}"),
        }
    }
}

impl std::error::Error for StructureError {}
