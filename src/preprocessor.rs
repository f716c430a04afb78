/// Run settings and configuration files.
///
/// Holds the [`config::Config`] of a run and loads configuration files whose
/// `name=expression` lines define global variables before the first pass.
pub mod config;
/// The directive registry.
///
/// Declares every directive with its name, argument shape and pass, finds
/// the directive named on a line and validates its argument.
pub mod directive;
/// The hook receiving `action` directives.
pub mod extension;
/// Both passes over a single file.
///
/// The global scanner collects `global` definitions and `excludeif`
/// conditions. The line processor drives the block state machine, executes
/// directives, rewrites macro and uncommented lines and follows includes.
pub mod file;
/// The multi-file run: discovery, both passes, exclusion and output.
pub mod pipeline;
/// Per-file state: the conditional block stack, output sections and local
/// variables.
pub mod state;
/// Variable tables and the scope expressions are evaluated in.
pub mod variables;
