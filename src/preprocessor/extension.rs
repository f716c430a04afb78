use std::path::Path;

use crate::expression::value::Value;

/// Where an `action` directive was found.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// The file containing the directive.
    pub file: &'a Path,
    /// The 1-based line of the directive.
    pub line: usize,
}

/// Receives the values of `action` directives.
///
/// Without a registered extension, `action` directives are ignored and their
/// arguments are not evaluated. A registered extension returning `false`
/// stops the run with an error.
///
/// # Example
/// ```
/// use commentpp::{
///     expression::value::Value,
///     preprocessor::extension::{ActionContext, PreprocessorExtension},
/// };
///
/// struct Collect(Vec<Value>);
///
/// impl PreprocessorExtension for Collect {
///     fn process_action(&mut self, _context: &ActionContext, args: &[Value]) -> bool {
///         self.0.extend_from_slice(args);
///         true
///     }
/// }
/// ```
pub trait PreprocessorExtension {
    /// Handles the evaluated arguments of one `action` directive, in order.
    /// Returns `false` to report a failure.
    fn process_action(&mut self, context: &ActionContext, args: &[Value]) -> bool;
}
