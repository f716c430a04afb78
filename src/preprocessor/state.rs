use crate::{
    error::StructureError,
    expression::value::Value,
    preprocessor::{directive::Directive, variables::VariableTable},
};

/// One open conditional block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    /// The branch currently being read was selected.
    pub condition_true:   bool,
    /// Some branch of the block was already selected.
    pub any_branch_taken: bool,
    /// Every enclosing block is active.
    pub parent_active:    bool,
    /// The block already had its `else`.
    pub else_seen:        bool,
    /// The directive that opened the block.
    pub opened_by:        Directive,
    /// The line the block was opened on.
    pub opened_at:        usize,
}

impl BlockFrame {
    /// A block's lines are emitted iff its own condition holds and every
    /// enclosing block is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.parent_active && self.condition_true
    }
}

/// A stack of conditional blocks with the branch selection rules of
/// `if`/`elif`/`else`/`endif`.
///
/// Both the line pass and the global pass use one, with their own directive
/// names.
#[derive(Debug, Clone, Default)]
pub struct BlockStack {
    frames: Vec<BlockFrame>,
}

impl BlockStack {
    /// Tests whether lines at the current position are active. The implicit
    /// root block is always active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.frames.last().is_none_or(BlockFrame::is_active)
    }

    /// Returns the number of open blocks.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a block. `condition` is `None` when the block is opened inside an
    /// inactive block, where conditions are not evaluated.
    pub fn open(&mut self, condition: Option<bool>, opened_by: Directive, opened_at: usize) {
        let parent_active = self.is_active();
        let condition_true = parent_active && condition.unwrap_or(false);
        self.frames.push(BlockFrame { condition_true,
                                      any_branch_taken: condition_true,
                                      parent_active,
                                      else_seen: false,
                                      opened_by,
                                      opened_at });
    }

    /// Tests whether an `elif` at this point must evaluate its condition.
    ///
    /// # Errors
    /// Returns a `StructureError` if no block is open or it had its `else`.
    pub fn elif_needs_condition(&self, directive: Directive) -> Result<bool, StructureError> {
        let frame = self.top(directive)?;
        if frame.else_seen {
            return Err(StructureError::AfterElse { directive: directive.name().to_string() });
        }
        Ok(frame.parent_active && !frame.any_branch_taken)
    }

    /// Moves to an `elif` branch. `condition` is `None` when it was not
    /// evaluated, which selects nothing.
    ///
    /// # Errors
    /// Returns a `StructureError` if no block is open or it had its `else`.
    pub fn elif(&mut self, condition: Option<bool>, directive: Directive) -> Result<(), StructureError> {
        let selectable = self.elif_needs_condition(directive)?;
        let frame = self.top_mut(directive)?;
        frame.condition_true = selectable && condition.unwrap_or(false);
        frame.any_branch_taken |= frame.condition_true;
        Ok(())
    }

    /// Moves to the `else` branch.
    ///
    /// # Errors
    /// Returns a `StructureError` if no block is open or it already had its
    /// `else`.
    pub fn otherwise(&mut self, directive: Directive) -> Result<(), StructureError> {
        let frame = self.top_mut(directive)?;
        if frame.else_seen {
            return Err(StructureError::AfterElse { directive: directive.name().to_string() });
        }
        frame.else_seen = true;
        frame.condition_true = frame.parent_active && !frame.any_branch_taken;
        frame.any_branch_taken = true;
        Ok(())
    }

    /// Closes the innermost block.
    ///
    /// # Errors
    /// Returns a `StructureError` if no block is open.
    pub fn close(&mut self, directive: Directive) -> Result<(), StructureError> {
        self.frames
            .pop()
            .map(|_| ())
            .ok_or_else(|| StructureError::WithoutIf { directive: directive.name().to_string() })
    }

    /// Checks that at most `depth` blocks are still open.
    ///
    /// # Errors
    /// Returns `StructureError::UnclosedBlock` for the innermost extra block.
    pub fn ensure_depth(&self, depth: usize) -> Result<(), StructureError> {
        match self.frames.get(depth..).and_then(<[BlockFrame]>::last) {
            Some(frame) => Err(StructureError::UnclosedBlock { directive: frame.opened_by.name().to_string(),
                                                               line:      frame.opened_at, }),
            None => Ok(()),
        }
    }

    fn top(&self, directive: Directive) -> Result<&BlockFrame, StructureError> {
        self.frames
            .last()
            .ok_or_else(|| StructureError::WithoutIf { directive: directive.name().to_string() })
    }

    fn top_mut(&mut self, directive: Directive) -> Result<&mut BlockFrame, StructureError> {
        self.frames
            .last_mut()
            .ok_or_else(|| StructureError::WithoutIf { directive: directive.name().to_string() })
    }
}

/// The section emitted text currently goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Emitted before the normal section.
    Prefix,
    /// The regular output.
    #[default]
    Normal,
    /// Emitted after the normal section.
    Postfix,
}

/// The state of one file in the line pass.
///
/// Included files share the state of the file that includes them.
#[derive(Debug, Default)]
pub struct PreprocessingState {
    /// Conditional blocks opened by `if`, `ifdef` and `ifndef`.
    pub blocks: BlockStack,
    /// Where emitted lines go.
    pub target: OutputTarget,
    locals:     VariableTable,
    prefix:     Vec<String>,
    normal:     Vec<String>,
    postfix:    Vec<String>,
}

impl PreprocessingState {
    /// Creates the initial state: no blocks, normal output, no locals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line, without terminator, to the current output section.
    pub fn emit(&mut self, line: String) {
        match self.target {
            OutputTarget::Prefix => self.prefix.push(line),
            OutputTarget::Normal => self.normal.push(line),
            OutputTarget::Postfix => self.postfix.push(line),
        }
    }

    /// Returns every emitted line: prefix, then normal, then postfix.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.prefix
            .iter()
            .chain(&self.normal)
            .chain(&self.postfix)
            .map(String::as_str)
    }

    /// Returns the local variables.
    #[must_use]
    pub const fn locals(&self) -> &VariableTable {
        &self.locals
    }

    /// Returns the value of a local variable.
    #[must_use]
    pub fn get_local_variable(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Defines or overwrites a local variable.
    pub fn set_local_variable(&mut self, name: &str, value: Value) {
        self.locals.set(name, value);
    }

    /// Removes a local variable.
    pub fn remove_local_variable(&mut self, name: &str) -> Option<Value> {
        self.locals.remove(name)
    }
}
