use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use walkdir::WalkDir;

use crate::{
    error::PreprocessError,
    expression::value::Value,
    preprocessor::{
        config::{Config, define_global, load_config_text},
        extension::PreprocessorExtension,
        file::{ExcludeIfInfo, GlobalScanner, LineProcessor},
        variables::VariableTable,
    },
};

/// What a run did with the files it found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files preprocessed in the line pass.
    pub processed: usize,
    /// Files skipped by `excludeif` or by their extension.
    pub excluded:  usize,
    /// Files copied unchanged.
    pub copied:    usize,
}

/// A file found below a source directory.
#[derive(Debug, Clone)]
struct SourceFile {
    path:     PathBuf,
    relative: PathBuf,
}

/// How a source file is handled, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Preprocessed,
    CopyOnly,
    Excluded,
}

/// Runs the two passes over a set of files.
///
/// Owns the global variable table, which is shared by every file of the run
/// and persists from the global pass into the line pass.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use commentpp::{
///     expression::value::Value,
///     preprocessor::{config::Config, pipeline::Preprocessor},
/// };
///
/// let mut preprocessor = Preprocessor::new(Config::default());
/// preprocessor.set_global_variable("debug", Value::Bool(false));
///
/// let output = preprocessor.preprocess(Path::new("Main.java"), "//#if !debug\nrelease();\n//#endif\n")
///                          .unwrap();
/// assert_eq!(output, "release();\n");
/// ```
pub struct Preprocessor {
    config:    Config,
    globals:   VariableTable,
    extension: Option<Box<dyn PreprocessorExtension>>,
}

impl Preprocessor {
    /// Creates a preprocessor with an empty global table and no extension.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config,
               globals: VariableTable::new(),
               extension: None }
    }

    /// Registers the extension receiving `action` directives.
    #[must_use]
    pub fn with_extension(mut self, extension: Box<dyn PreprocessorExtension>) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Replaces or removes the extension receiving `action` directives.
    pub fn set_extension(&mut self, extension: Option<Box<dyn PreprocessorExtension>>) {
        self.extension = extension;
    }

    /// Returns the run settings.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the global variable table.
    #[must_use]
    pub const fn globals(&self) -> &VariableTable {
        &self.globals
    }

    /// Returns the value of a global variable.
    #[must_use]
    pub fn get_global_variable(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Defines or overwrites a global variable.
    pub fn set_global_variable(&mut self, name: &str, value: Value) {
        self.globals.set(name, value);
    }

    /// Evaluates a `name=expression` definition, as given on the command
    /// line, into the global table.
    pub fn define(&mut self, definition: &str) -> Result<(), PreprocessError> {
        define_global(definition, Path::new("<command line>"), 0, &mut self.globals)
            .map_err(|kind| PreprocessError::new(kind).with_fragment(definition))
    }

    /// Runs the global pass over one file.
    ///
    /// `global` definitions go straight into the global table; the returned
    /// `excludeif` conditions are meant to be evaluated once every file was
    /// scanned.
    pub fn scan_globals(&mut self, path: &Path, text: &str) -> Result<Vec<ExcludeIfInfo>, PreprocessError> {
        GlobalScanner::new(&self.config, &mut self.globals).scan(path, text)
    }

    /// Runs the line pass over one file and returns its output.
    pub fn preprocess(&mut self, path: &Path, text: &str) -> Result<String, PreprocessError> {
        LineProcessor::new(&self.config, &mut self.globals, &mut self.extension).process(path, text)
    }

    /// Processes every file below the source directories into the
    /// destination tree.
    ///
    /// Configuration files are loaded first. The global pass then scans all
    /// preprocessed files before the line pass writes any of them, so an
    /// `excludeif` sees the final value of every global. Files with other
    /// extensions are copied unless excluded. The first error stops the run.
    pub fn run(&mut self) -> Result<RunSummary, PreprocessError> {
        self.load_config_files()?;

        let mut summary = RunSummary::default();
        let mut sources = Vec::new();
        let mut copies = Vec::new();
        for file in self.collect_files()? {
            match self.classify(&file.path) {
                FileKind::Preprocessed => sources.push(file),
                FileKind::CopyOnly => copies.push(file),
                FileKind::Excluded => {
                    debug!("Skipping {}", file.path.display());
                    summary.excluded += 1;
                },
            }
        }

        info!("Global pass over {} files", sources.len());
        let mut texts = Vec::with_capacity(sources.len());
        let mut exclusions = Vec::new();
        for file in &sources {
            let text = fs::read_to_string(&file.path).map_err(|e| PreprocessError::in_file(e, &file.path))?;
            exclusions.extend(self.scan_globals(&file.path, &text)?);
            texts.push(text);
        }

        let mut excluded_files = HashSet::new();
        for exclusion in &exclusions {
            if exclusion.evaluate(&self.globals)? {
                info!("Excluding {} (excludeif at line {})", exclusion.file.display(), exclusion.line);
                excluded_files.insert(exclusion.file.clone());
            }
        }

        self.prepare_destination()?;

        info!("Line pass over {} files", sources.len().saturating_sub(excluded_files.len()));
        for (file, text) in sources.iter().zip(&texts) {
            if excluded_files.contains(&file.path) {
                summary.excluded += 1;
                continue;
            }
            let output = self.preprocess(&file.path, text)?;
            self.write_output(file, &output)?;
            summary.processed += 1;
        }

        for file in &copies {
            self.copy_file(file)?;
            summary.copied += 1;
        }

        info!("Done: {} processed, {} copied, {} excluded",
              summary.processed, summary.copied, summary.excluded);
        Ok(summary)
    }

    fn classify(&self, path: &Path) -> FileKind {
        if self.config.is_excluded(path) {
            FileKind::Excluded
        } else if self.config.is_preprocessed(path) {
            FileKind::Preprocessed
        } else {
            FileKind::CopyOnly
        }
    }

    fn load_config_files(&mut self) -> Result<(), PreprocessError> {
        for path in &self.config.config_files {
            debug!("Loading configuration {}", path.display());
            let text = fs::read_to_string(path).map_err(|e| PreprocessError::in_file(e, path))?;
            load_config_text(path, &text, &mut self.globals)?;
        }
        Ok(())
    }

    /// Lists the files below every source directory, sorted by name, leaving
    /// out the destination tree.
    fn collect_files(&self) -> Result<Vec<SourceFile>, PreprocessError> {
        let destination = fs::canonicalize(&self.config.destination).ok();
        let mut files = Vec::new();

        for directory in &self.config.source_directories {
            let walker = WalkDir::new(directory).sort_by_file_name()
                                                .into_iter()
                                                .filter_entry(|entry| {
                                                    !entry.file_type().is_dir()
                                                    || destination.is_none()
                                                    || fs::canonicalize(entry.path()).ok() != destination
                                                });
            for entry in walker {
                let entry = entry.map_err(|e| PreprocessError::in_file(io::Error::from(e), directory))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path()
                                    .strip_prefix(directory)
                                    .unwrap_or_else(|_| entry.path())
                                    .to_path_buf();
                files.push(SourceFile { path: entry.into_path(),
                                        relative });
            }
        }

        Ok(files)
    }

    fn prepare_destination(&self) -> Result<(), PreprocessError> {
        if self.config.disable_output {
            return Ok(());
        }
        let destination = &self.config.destination;
        if self.config.clear_destination && destination.exists() {
            info!("Clearing {}", destination.display());
            fs::remove_dir_all(destination).map_err(|e| PreprocessError::in_file(e, destination))?;
        }
        fs::create_dir_all(destination).map_err(|e| PreprocessError::in_file(e, destination))
    }

    fn target_path(&self, file: &SourceFile) -> Result<PathBuf, PreprocessError> {
        let target = self.config.destination.join(&file.relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PreprocessError::in_file(e, parent))?;
        }
        Ok(target)
    }

    fn write_output(&self, file: &SourceFile, output: &str) -> Result<(), PreprocessError> {
        if self.config.disable_output {
            return Ok(());
        }
        let target = self.target_path(file)?;
        debug!("Writing {}", target.display());
        fs::write(&target, output).map_err(|e| PreprocessError::in_file(e, &target))
    }

    fn copy_file(&self, file: &SourceFile) -> Result<(), PreprocessError> {
        if self.config.disable_output {
            return Ok(());
        }
        let target = self.target_path(file)?;
        debug!("Copying {} to {}", file.path.display(), target.display());
        fs::copy(&file.path, &target).map(|_| ())
                                      .map_err(|e| PreprocessError::in_file(e, &file.path))
    }
}
