use std::{
    collections::HashMap,
    path::{MAIN_SEPARATOR, Path},
};

use crate::expression::{evaluator::ExpressionContext, value::Value};

/// A variable table with case-insensitive names.
///
/// Names are normalized to lower case on every access.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    values: HashMap<String, Value>,
}

impl VariableTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&name.to_lowercase())
    }

    /// Defines or overwrites a variable.
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_lowercase(), value);
    }

    /// Removes a variable, returning its last value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(&name.to_lowercase())
    }

    /// Tests whether a variable is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_lowercase())
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Tests whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Checks that text is usable as a variable name.
#[must_use]
pub fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next()
         .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '$'))
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// The variables visible to an expression at one line of one file.
///
/// Lookup order is: special variables describing the current position, then
/// the local table of the file (if any), then the global table.
pub struct Scope<'a> {
    /// The file being processed.
    pub file:    &'a Path,
    /// The current 1-based line.
    pub line:    usize,
    /// Variables local to the file.
    pub locals:  Option<&'a VariableTable>,
    /// Variables shared by every file of the run.
    pub globals: &'a VariableTable,
}

impl Scope<'_> {
    fn special(&self, name: &str) -> Option<Value> {
        match name {
            "__line__" => i64::try_from(self.line).ok().map(Value::Int),
            "__filename__" => {
                let name = self.file.file_name().map(|n| n.to_string_lossy().into_owned());
                Some(Value::Str(name.unwrap_or_default()))
            },
            "__filefolder__" => {
                let mut folder = self.file
                                     .parent()
                                     .map(|p| p.to_string_lossy().into_owned())
                                     .unwrap_or_default();
                if !folder.is_empty() && !folder.ends_with(MAIN_SEPARATOR) {
                    folder.push(MAIN_SEPARATOR);
                }
                Some(Value::Str(folder))
            },
            "__file__" => Some(Value::Str(self.file.to_string_lossy().into_owned())),
            _ => None,
        }
    }
}

impl ExpressionContext for Scope<'_> {
    fn variable(&self, name: &str) -> Option<Value> {
        self.special(name)
            .or_else(|| self.locals.and_then(|locals| locals.get(name).cloned()))
            .or_else(|| self.globals.get(name).cloned())
    }
}
