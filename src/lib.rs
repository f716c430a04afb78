//! # commentpp
//!
//! commentpp is a source preprocessor driven by directives written in
//! comments. Lines such as `//#if version >= 2` open conditional blocks,
//! `//#local` and `//#global` define variables, and `/*$expression$*/`
//! inserts evaluated values into the text. Conditions are written in a small
//! typed expression language with integers, floats, strings and booleans.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::path::Path;

use crate::{
    error::PreprocessError,
    preprocessor::{config::Config, pipeline::Preprocessor},
};

/// Provides unified error types for every phase.
///
/// This module defines all errors that can be raised while tokenizing,
/// parsing or evaluating expressions, while interpreting directives, and
/// while reading or writing files. Every failure is fatal and ends up in a
/// single `PreprocessError` that carries the position it happened at.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator,
///   directive structure, I/O).
/// - Attaches file, line, column, source fragment and include stack.
/// - Supports integration with standard error handling traits.
pub mod error;
/// The typed expression language used by directive arguments.
///
/// This module ties together the lexer, the parser, the value model and the
/// operator and function registries, and evaluates expression trees against
/// a variable context.
///
/// # Responsibilities
/// - Tokenizes and parses expressions into trees.
/// - Defines the value types and their conversions.
/// - Dispatches operators and functions by argument type signature.
pub mod expression;
/// The directive engine and the file pipeline.
///
/// This module recognizes directive lines, keeps the conditional block state
/// of each file, runs the global pass and the line pass, and writes the
/// output tree.
///
/// # Responsibilities
/// - Maps directive names to their argument shapes and effects.
/// - Decides for every line whether it is emitted, rewritten or dropped.
/// - Walks source directories, excludes, copies and writes files.
pub mod preprocessor;
/// General utilities for safe numeric conversion.
///
/// This module provides conversions between integer and floating point types
/// that fail instead of silently losing precision.
pub mod util;

/// Preprocesses a single text with the default configuration.
///
/// Runs the global pass and then the line pass over `source`, as if it were
/// the only file of a run named `input.txt`.
///
/// # Errors
/// Returns the first error of either pass.
///
/// # Examples
/// ```
/// use commentpp::preprocess_text;
///
/// let source = "//#if 2>1\nkept\n//#else\ndropped\n//#endif\n";
/// assert_eq!(preprocess_text(source).unwrap(), "kept\n");
///
/// // An `else` without an `if` is an error.
/// assert!(preprocess_text("//#else\n").is_err());
/// ```
pub fn preprocess_text(source: &str) -> Result<String, PreprocessError> {
    let path = Path::new("input.txt");
    let mut preprocessor = Preprocessor::new(Config::default());

    for exclusion in preprocessor.scan_globals(path, source)? {
        if exclusion.evaluate(preprocessor.globals())? {
            return Ok(String::new());
        }
    }
    preprocessor.preprocess(path, source)
}
