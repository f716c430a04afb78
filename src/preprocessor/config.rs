use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    error::{ErrorKind, PreprocessError},
    expression::parser::parse_expression,
    preprocessor::variables::{Scope, VariableTable, is_variable_name},
};

/// Settings of a preprocessing run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories whose files are preprocessed or copied.
    pub source_directories:  Vec<PathBuf>,
    /// Root of the output tree; relative input paths are mirrored below it.
    pub destination:         PathBuf,
    /// Extensions of files that are preprocessed, lower case, without dot.
    pub extensions:          Vec<String>,
    /// Extensions of files that are neither preprocessed nor copied.
    pub excluded_extensions: Vec<String>,
    /// The text that starts a directive line.
    pub directive_prefix:    String,
    /// Line terminator used for output lines.
    pub eol:                 String,
    /// End the output exactly as the input ends, with or without a final
    /// terminator.
    pub care_for_last_eol:   bool,
    /// Remove the destination directory before writing.
    pub clear_destination:   bool,
    /// Run both passes but write nothing.
    pub disable_output:      bool,
    /// Files with global variable definitions, loaded before the first pass.
    pub config_files:        Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self { source_directories:  vec![PathBuf::from(".")],
               destination:         PathBuf::from("preprocessed"),
               extensions:          ["java", "txt", "htm", "html"].map(String::from).to_vec(),
               excluded_extensions: vec!["xml".to_string()],
               directive_prefix:    "//#".to_string(),
               eol:                 "\n".to_string(),
               care_for_last_eol:   false,
               clear_destination:   false,
               disable_output:      false,
               config_files:        Vec::new(), }
    }
}

/// Returns the lower case extension of a path.
fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

impl Config {
    /// Tests whether a file is preprocessed.
    ///
    /// # Example
    /// ```
    /// use std::path::Path;
    ///
    /// use commentpp::preprocessor::config::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.is_preprocessed(Path::new("src/Main.JAVA")));
    /// assert!(!config.is_preprocessed(Path::new("logo.png")));
    /// ```
    #[must_use]
    pub fn is_preprocessed(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Tests whether a file is left out of the output entirely.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.excluded_extensions.contains(&ext))
    }
}

/// Parses a comma separated extension list such as `java, .TXT`.
#[must_use]
pub fn parse_extensions(text: &str) -> Vec<String> {
    text.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Evaluates a `name=expression` definition into the global table.
///
/// The expression sees the global variables defined so far.
///
/// # Errors
/// Returns `ErrorKind::Config` if the text is not a definition, and the
/// expression error if it does not evaluate.
pub fn define_global(text: &str, source: &Path, line: usize, globals: &mut VariableTable) -> Result<(), ErrorKind> {
    let not_a_definition = || ErrorKind::Config { message: format!("Expected name=expression but found: {text}") };

    let (name, expression) = text.split_once('=').ok_or_else(not_a_definition)?;
    let name = name.trim();
    if !is_variable_name(name) {
        return Err(not_a_definition());
    }

    let value = parse_expression(expression.trim())?.evaluate(&Scope { file: source,
                                                                        line,
                                                                        locals: None,
                                                                        globals: &*globals })?;
    debug!("Global {} = {}", name.to_lowercase(), value.to_literal());
    globals.set(name, value);
    Ok(())
}

/// Loads a configuration file into the global table.
///
/// Every line is either blank, a `#` comment or a `name=expression`
/// definition; definitions are evaluated in file order.
///
/// # Errors
/// Returns a `PreprocessError` pointing at the first invalid line.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use commentpp::{
///     expression::value::Value,
///     preprocessor::{config::load_config_text, variables::VariableTable},
/// };
///
/// let mut globals = VariableTable::new();
/// let text = "# build settings\nVersion=2\nlabel=\"v\" + version\n";
/// load_config_text(Path::new("build.cfg"), text, &mut globals).unwrap();
///
/// assert_eq!(globals.get("label"), Some(&Value::Str("v2".into())));
/// ```
pub fn load_config_text(path: &Path, text: &str, globals: &mut VariableTable) -> Result<(), PreprocessError> {
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        define_global(trimmed, path, index + 1, globals).map_err(|kind| {
                                                            PreprocessError::at(kind, path, index + 1).with_fragment(trimmed)
                                                        })?;
    }
    Ok(())
}
