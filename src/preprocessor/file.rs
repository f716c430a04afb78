use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    error::{
        ErrorKind, EvaluationError, ExpressionError, FilePosition, ParseError, PreprocessError,
        StructureError,
    },
    expression::{evaluator::ExpressionContext, item::ExpressionTree, parser::parse_expression, value::Value},
    preprocessor::{
        config::Config,
        directive::{
            Directive, Pass, expression_argument, expression_list_argument, find_directive,
            parse_argument, split_assignment, switch_argument, variable_argument,
        },
        extension::{ActionContext, PreprocessorExtension},
        state::{BlockStack, OutputTarget, PreprocessingState},
        variables::{Scope, VariableTable},
    },
};

const MACRO_OPEN: &str = "/*$";
const MACRO_CLOSE: &str = "$*/";
const UNCOMMENT_RAW: &str = "//$$";
const UNCOMMENT: &str = "//$";

/// An `excludeif` condition recorded by the global pass.
#[derive(Debug, Clone)]
pub struct ExcludeIfInfo {
    /// The parsed condition.
    pub condition: ExpressionTree,
    /// The file the directive belongs to.
    pub file:      PathBuf,
    /// The line of the directive.
    pub line:      usize,
}

impl ExcludeIfInfo {
    /// Evaluates the condition against the final global table.
    ///
    /// # Errors
    /// Returns a `PreprocessError` if evaluation fails or the result is not a
    /// boolean.
    pub fn evaluate(&self, globals: &VariableTable) -> Result<bool, PreprocessError> {
        let scope = Scope { file: &self.file,
                            line: self.line,
                            locals: None,
                            globals };
        self.condition
            .evaluate(&scope)
            .and_then(|value| value.as_boolean())
            .map_err(|error| {
                PreprocessError::at(error, &self.file, self.line).with_fragment(&self.condition.source)
            })
    }
}

/// Whether a file continues after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// An `exit` directive stopped the file.
    Exit,
}

/// Splits text into lines, each paired with its terminator (`\n`, `\r\n`, or
/// empty for a last line without one).
fn split_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split_inclusive('\n').map(|line| {
                                  if let Some(content) = line.strip_suffix("\r\n") {
                                      (content, "\r\n")
                                  } else if let Some(content) = line.strip_suffix('\n') {
                                      (content, "\n")
                                  } else {
                                      (line, "")
                                  }
                              })
}

/// Returns the 1-based column where `rest`, a suffix of `content`, starts.
fn column_of(content: &str, rest: &str) -> usize {
    content.chars().count() - rest.chars().count() + 1
}

/// Narrows a column to an expression error inside an argument that starts at
/// `argument_column`.
fn error_column(kind: &ErrorKind, argument_column: usize) -> usize {
    match kind {
        ErrorKind::Expression(error) => {
            error.column()
                 .map_or(argument_column, |column| argument_column + column - 1)
        },
        _ => argument_column,
    }
}

/// Returns the directive and its argument if the line is a directive line.
fn directive_line<'t>(prefix: &str, content: &'t str) -> Option<Result<(Directive, &'t str), StructureError>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    Some(find_directive(rest).ok_or_else(|| StructureError::UnknownDirective { text: rest.trim_end().to_string() }))
}

/// The global pass over one file.
///
/// Handles `_if`, `_else`, `_endif`, `global` and `excludeif`. Every other
/// line, including the line pass conditionals, is ignored.
pub struct GlobalScanner<'a> {
    config:     &'a Config,
    globals:    &'a mut VariableTable,
    blocks:     BlockStack,
    exclusions: Vec<ExcludeIfInfo>,
    column:     usize,
}

impl<'a> GlobalScanner<'a> {
    /// Creates a scanner writing definitions into `globals`.
    pub fn new(config: &'a Config, globals: &'a mut VariableTable) -> Self {
        Self { config,
               globals,
               blocks: BlockStack::default(),
               exclusions: Vec::new(),
               column: 1 }
    }

    /// Scans a file and returns its `excludeif` conditions.
    ///
    /// # Errors
    /// Returns a `PreprocessError` for malformed global pass directives,
    /// failed evaluations and unbalanced `_if` blocks.
    pub fn scan(mut self, path: &Path, text: &str) -> Result<Vec<ExcludeIfInfo>, PreprocessError> {
        for (index, (content, _)) in split_lines(text).enumerate() {
            let line = index + 1;
            let Some(Ok((directive, argument))) = directive_line(&self.config.directive_prefix, content) else {
                continue;
            };
            self.column = column_of(content, argument.trim_start());
            let result = self.scan_directive(directive, argument, path, line);
            result.map_err(|kind| {
                      let column = error_column(&kind, self.column);
                      PreprocessError::at(kind, path, line).with_column(column)
                                                           .with_fragment(content.trim())
                  })?;
        }

        self.blocks.ensure_depth(0).map_err(|error| {
                                        let line = match &error {
                                            StructureError::UnclosedBlock { line, .. } => *line,
                                            _ => 0,
                                        };
                                        PreprocessError::at(error, path, line)
                                    })?;
        Ok(self.exclusions)
    }

    fn scan_directive(&mut self, directive: Directive, argument: &str, path: &Path, line: usize) -> Result<(), ErrorKind> {
        match directive {
            Directive::GlobalIf => {
                let condition = if self.blocks.is_active() {
                    let scope = Scope { file: path,
                                        line,
                                        locals: None,
                                        globals: &*self.globals };
                    Some(expression_argument(directive, argument)?.evaluate(&scope)?
                                                                  .as_boolean()?)
                } else {
                    None
                };
                self.blocks.open(condition, directive, line);
            },
            Directive::GlobalElse => {
                parse_argument(directive, argument)?;
                self.blocks.otherwise(directive)?;
            },
            Directive::GlobalEndIf => {
                parse_argument(directive, argument)?;
                self.blocks.close(directive)?;
            },
            Directive::Global if self.blocks.is_active() => {
                let (name, expression) = split_assignment(directive, argument)?;
                self.column += column_of(argument.trim_start(), expression) - 1;
                let tree = parse_expression(expression.trim_end())?;
                let value = tree.evaluate(&Scope { file: path,
                                                   line,
                                                   locals: None,
                                                   globals: &*self.globals })?;
                debug!("{}:{line}: global {name} = {}", path.display(), value.to_literal());
                self.globals.set(&name, value);
            },
            Directive::ExcludeIf if self.blocks.is_active() => {
                let condition = expression_argument(directive, argument)?;
                self.exclusions.push(ExcludeIfInfo { condition,
                                                     file: path.to_path_buf(),
                                                     line });
            },
            _ => {},
        }
        Ok(())
    }
}

/// A failure inside the line pass: either already located in an included
/// file, or still waiting for the position of the current line.
enum Failure {
    Located(PreprocessError),
    Unlocated(ErrorKind),
}

impl From<ErrorKind> for Failure {
    fn from(kind: ErrorKind) -> Self {
        Self::Unlocated(kind)
    }
}

impl From<StructureError> for Failure {
    fn from(error: StructureError) -> Self {
        Self::Unlocated(error.into())
    }
}

impl From<ParseError> for Failure {
    fn from(error: ParseError) -> Self {
        Self::Unlocated(error.into())
    }
}

impl From<ExpressionError> for Failure {
    fn from(error: ExpressionError) -> Self {
        Self::Unlocated(error.into())
    }
}

impl From<EvaluationError> for Failure {
    fn from(error: EvaluationError) -> Self {
        Self::Unlocated(error.into())
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Self::Unlocated(error.into())
    }
}

/// The line pass over one file and the files it includes.
pub struct LineProcessor<'a> {
    config:        &'a Config,
    globals:       &'a mut VariableTable,
    extension:     &'a mut Option<Box<dyn PreprocessorExtension>>,
    state:         PreprocessingState,
    include_stack: Vec<FilePosition>,
    column:        usize,
}

impl<'a> LineProcessor<'a> {
    /// Creates a processor with a fresh per-file state.
    pub fn new(config: &'a Config,
               globals: &'a mut VariableTable,
               extension: &'a mut Option<Box<dyn PreprocessorExtension>>)
               -> Self {
        Self { config,
               globals,
               extension,
               state: PreprocessingState::new(),
               include_stack: Vec::new(),
               column: 1 }
    }

    /// Processes a file and renders its output.
    ///
    /// The output is the prefix section, then the normal section, then the
    /// postfix section. Lines end with the configured terminator, except that
    /// with `care_for_last_eol` the output ends exactly as `text` ends.
    ///
    /// # Errors
    /// Returns the first `PreprocessError` of the file or its includes.
    pub fn process(mut self, path: &Path, text: &str) -> Result<String, PreprocessError> {
        self.process_text(path, text)?;

        let eol = self.config.eol.as_str();
        let lines = self.state.lines().collect::<Vec<_>>();
        if !self.config.care_for_last_eol {
            return Ok(lines.iter().map(|line| format!("{line}{eol}")).collect());
        }

        let mut output = lines.join(eol);
        if !lines.is_empty() {
            output.push_str(split_lines(text).last().map_or("", |(_, terminator)| terminator));
        }
        Ok(output)
    }

    fn scope<'s>(&'s self, path: &'s Path, line: usize) -> Scope<'s> {
        Scope { file: path,
                line,
                locals: Some(self.state.locals()),
                globals: &*self.globals }
    }

    fn locate(&self, kind: ErrorKind, path: &Path, line: usize, content: &str) -> PreprocessError {
        let column = error_column(&kind, self.column);
        PreprocessError::at(kind, path, line).with_column(column)
                                             .with_fragment(content.trim())
                                             .with_include_stack(&self.include_stack)
    }

    fn process_text(&mut self, path: &Path, text: &str) -> Result<Flow, PreprocessError> {
        let depth = self.state.blocks.depth();

        for (index, (content, _)) in split_lines(text).enumerate() {
            let line = index + 1;
            self.column = 1;
            match self.process_line(path, line, content) {
                Ok(Flow::Continue) => {},
                Ok(Flow::Exit) => {
                    debug!("{}:{line}: exit", path.display());
                    return Ok(Flow::Exit);
                },
                Err(Failure::Located(error)) => return Err(error),
                Err(Failure::Unlocated(kind)) => return Err(self.locate(kind, path, line, content)),
            }
        }

        self.state.blocks.ensure_depth(depth).map_err(|error| {
                                                 let line = match &error {
                                                     StructureError::UnclosedBlock { line, .. } => *line,
                                                     _ => 0,
                                                 };
                                                 PreprocessError::at(error, path, line).with_include_stack(&self.include_stack)
                                             })?;
        Ok(Flow::Continue)
    }

    fn process_line(&mut self, path: &Path, line: usize, content: &str) -> Result<Flow, Failure> {
        let Some(found) = directive_line(&self.config.directive_prefix, content) else {
            if self.state.blocks.is_active() {
                let text = self.render_text(path, line, content)?;
                self.state.emit(text);
            }
            return Ok(Flow::Continue);
        };
        let (directive, argument) = found?;
        self.column = column_of(content, argument.trim_start());

        if directive.pass() == Pass::Global {
            return Ok(Flow::Continue);
        }
        if directive.is_conditional() {
            self.conditional(directive, argument, path, line)?;
            return Ok(Flow::Continue);
        }
        if !self.state.blocks.is_active() {
            return Ok(Flow::Continue);
        }
        self.execute(directive, argument, path, line)
    }

    /// Applies `if`, `ifdef`, `ifndef`, `elif`, `else` and `endif`.
    ///
    /// Conditions are evaluated only when their result can select a branch.
    fn conditional(&mut self, directive: Directive, argument: &str, path: &Path, line: usize) -> Result<(), ErrorKind> {
        match directive {
            Directive::Elif => {
                let condition = if self.state.blocks.elif_needs_condition(directive)? {
                    Some(self.condition(directive, argument, path, line)?)
                } else {
                    None
                };
                self.state.blocks.elif(condition, directive)?;
            },
            Directive::Else => {
                parse_argument(directive, argument)?;
                self.state.blocks.otherwise(directive)?;
            },
            Directive::EndIf => {
                parse_argument(directive, argument)?;
                self.state.blocks.close(directive)?;
            },
            _ => {
                let condition = if self.state.blocks.is_active() {
                    Some(self.condition(directive, argument, path, line)?)
                } else {
                    None
                };
                self.state.blocks.open(condition, directive, line);
            },
        }
        Ok(())
    }

    fn condition(&self, directive: Directive, argument: &str, path: &Path, line: usize) -> Result<bool, ErrorKind> {
        match directive {
            Directive::IfDef | Directive::IfNDef => {
                let name = variable_argument(directive, argument)?;
                let defined = self.scope(path, line).variable(&name).is_some();
                Ok(defined == (directive == Directive::IfDef))
            },
            _ => {
                let tree = expression_argument(directive, argument)?;
                Ok(tree.evaluate(&self.scope(path, line))?.as_boolean()?)
            },
        }
    }

    fn evaluate(&self, tree: &ExpressionTree, path: &Path, line: usize) -> Result<Value, ErrorKind> {
        Ok(tree.evaluate(&self.scope(path, line))?)
    }

    fn execute(&mut self, directive: Directive, argument: &str, path: &Path, line: usize) -> Result<Flow, Failure> {
        match directive {
            Directive::Local => {
                let (name, expression) = split_assignment(directive, argument)?;
                self.column += column_of(argument.trim_start(), expression) - 1;
                let tree = parse_expression(expression.trim_end())?;
                let value = self.evaluate(&tree, path, line)?;
                self.state.set_local_variable(&name, value);
            },
            Directive::Define => {
                let text = argument.trim();
                let (name, expression) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
                let name = variable_argument(directive, name)?;
                let expression = expression.trim_start();
                let value = if expression.is_empty() {
                    Value::Bool(true)
                } else {
                    self.column += column_of(text, expression) - 1;
                    let tree = parse_expression(expression)?;
                    self.evaluate(&tree, path, line)?
                };
                self.globals.set(&name, value);
            },
            Directive::Undef => {
                let name = variable_argument(directive, argument)?;
                self.state.remove_local_variable(&name);
                self.globals.remove(&name);
            },
            Directive::Prefix | Directive::Postfix => {
                let on = switch_argument(directive, argument)?;
                self.state.target = match (directive, on) {
                    (Directive::Prefix, true) => OutputTarget::Prefix,
                    (_, true) => OutputTarget::Postfix,
                    (_, false) => OutputTarget::Normal,
                };
            },
            Directive::Action => self.action(argument, path, line)?,
            Directive::Echo => {
                let text = self.substitute(path, line, argument.trim())?;
                info!("{}:{line}: {text}", path.display());
            },
            Directive::Warning => {
                let text = self.substitute(path, line, argument.trim())?;
                warn!("{}:{line}: {text}", path.display());
            },
            Directive::Error => {
                let message = self.substitute(path, line, argument.trim())?;
                return Err(EvaluationError::UserError { message }.into());
            },
            Directive::Exit => {
                parse_argument(directive, argument)?;
                return Ok(Flow::Exit);
            },
            Directive::ExitIf => {
                if self.condition(directive, argument, path, line)? {
                    return Ok(Flow::Exit);
                }
            },
            Directive::Include => return self.include(argument, path, line),
            _ => {},
        }
        Ok(Flow::Continue)
    }

    /// Hands the evaluated `action` arguments to the extension, if any.
    fn action(&mut self, argument: &str, path: &Path, line: usize) -> Result<(), ErrorKind> {
        if self.extension.is_none() {
            debug!("{}:{line}: action ignored, no extension registered", path.display());
            return Ok(());
        }

        let trees = expression_list_argument(Directive::Action, argument)?;
        let values = trees.iter()
                          .map(|tree| self.evaluate(tree, path, line))
                          .collect::<Result<Vec<_>, _>>()?;

        let context = ActionContext { file: path, line };
        if let Some(extension) = self.extension.as_mut()
           && !extension.process_action(&context, &values)
        {
            let arguments = values.iter()
                                  .map(Value::to_literal)
                                  .collect::<Vec<_>>()
                                  .join(", ");
            return Err(EvaluationError::ExtensionFailed { arguments }.into());
        }
        Ok(())
    }

    /// Processes another file in place, sharing the current state.
    fn include(&mut self, argument: &str, path: &Path, line: usize) -> Result<Flow, Failure> {
        let tree = expression_argument(Directive::Include, argument)?;
        let value = self.evaluate(&tree, path, line)?;
        let target = path.parent()
                         .unwrap_or_else(|| Path::new(""))
                         .join(value.as_string()?);

        let canonical = |file: &Path| fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        let target_key = canonical(&target);
        if canonical(path) == target_key
           || self.include_stack
                  .iter()
                  .any(|position| canonical(&position.file) == target_key)
        {
            return Err(StructureError::IncludeCycle { path: target.display().to_string() }.into());
        }

        let text = fs::read_to_string(&target)?;
        debug!("{}:{line}: including {}", path.display(), target.display());

        self.include_stack.push(FilePosition { file: path.to_path_buf(),
                                               line });
        let flow = self.process_text(&target, &text);
        self.include_stack.pop();
        flow.map_err(Failure::Located)
    }

    /// Produces the output text of an active non-directive line.
    fn render_text(&mut self, path: &Path, line: usize, content: &str) -> Result<String, ErrorKind> {
        let trimmed = content.trim_start();
        let indent = &content[..content.len() - trimmed.len()];

        if let Some(rest) = trimmed.strip_prefix(UNCOMMENT_RAW) {
            return Ok(format!("{indent}{rest}"));
        }
        if let Some(rest) = trimmed.strip_prefix(UNCOMMENT) {
            let from = content.len() - rest.len();
            return Ok(format!("{indent}{}", self.substitute_from(path, line, content, from)?));
        }
        self.substitute_from(path, line, content, 0)
    }

    fn substitute(&mut self, path: &Path, line: usize, text: &str) -> Result<String, ErrorKind> {
        self.substitute_from(path, line, text, 0)
    }

    /// Replaces every `/*$expression$*/` in `content[from..]` with the value
    /// of the expression. An opening marker without a closing one is kept as
    /// text.
    fn substitute_from(&mut self, path: &Path, line: usize, content: &str, from: usize) -> Result<String, ErrorKind> {
        let base_column = self.column;
        let mut output = String::new();
        let mut position = from;

        while let Some(start) = content[position..].find(MACRO_OPEN).map(|i| position + i) {
            let body = start + MACRO_OPEN.len();
            let Some(end) = content[body..].find(MACRO_CLOSE).map(|i| body + i) else {
                break;
            };
            output.push_str(&content[position..start]);

            let expression = &content[body..end];
            let leading = expression.len() - expression.trim_start().len();
            self.column = base_column + content[..body + leading].chars().count();
            let tree = parse_expression(expression.trim())?;
            output.push_str(&self.evaluate(&tree, path, line)?.to_string());

            position = end + MACRO_CLOSE.len();
        }

        output.push_str(&content[position..]);
        Ok(output)
    }
}
