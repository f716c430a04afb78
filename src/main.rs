use std::path::PathBuf;

use clap::Parser;
use commentpp::preprocessor::{
    config::{Config, parse_extensions},
    directive::Directive,
    pipeline::Preprocessor,
};
use log::{LevelFilter, Log, Metadata, Record};

/// commentpp preprocesses source trees driven by directives written in
/// comments, such as `//#if`, `//#local` and `/*$expression$*/`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// A source directory. May be given more than once.
    #[arg(short, long = "source", default_value = ".")]
    sources: Vec<PathBuf>,

    /// The directory the output tree is written to.
    #[arg(short, long, default_value = "preprocessed")]
    destination: PathBuf,

    /// Comma separated extensions of files to preprocess.
    #[arg(short, long, default_value = "java,txt,htm,html")]
    extensions: String,

    /// Comma separated extensions of files to leave out entirely.
    #[arg(long, default_value = "xml")]
    exclude_extensions: String,

    /// The text that starts a directive line.
    #[arg(long, default_value = "//#")]
    prefix: String,

    /// End every output file exactly as its input ends.
    #[arg(long)]
    keep_last_eol: bool,

    /// Remove the destination directory before writing.
    #[arg(long)]
    clear: bool,

    /// Run both passes without writing anything.
    #[arg(long)]
    no_output: bool,

    /// A configuration file with `name=expression` lines. May be given more
    /// than once.
    #[arg(short, long = "config")]
    configs: Vec<PathBuf>,

    /// Defines a global variable as `name=expression`.
    #[arg(short = 'D', long = "define")]
    defines: Vec<String>,

    /// Logs every file decision and `//#echo` message.
    #[arg(short, long)]
    verbose: bool,

    /// Prints the directive reference and exits.
    #[arg(long)]
    list_directives: bool,

    /// Configuration files given as `@file`.
    #[arg(value_name = "@FILE")]
    config_refs: Vec<String>,
}

/// Writes log records to standard error.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let args = Args::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if args.verbose { LevelFilter::Info } else { LevelFilter::Warn });
    }

    if args.list_directives {
        for directive in Directive::ALL {
            println!("{}", directive.reference());
        }
        return;
    }

    let mut config_files = args.configs;
    for reference in &args.config_refs {
        let Some(path) = reference.strip_prefix('@') else {
            eprintln!("Unexpected argument '{reference}'. Configuration files are given as @file.");
            std::process::exit(1);
        };
        config_files.push(PathBuf::from(path));
    }

    let config = Config { source_directories: args.sources,
                          destination: args.destination,
                          extensions: parse_extensions(&args.extensions),
                          excluded_extensions: parse_extensions(&args.exclude_extensions),
                          directive_prefix: args.prefix,
                          care_for_last_eol: args.keep_last_eol,
                          clear_destination: args.clear,
                          disable_output: args.no_output,
                          config_files,
                          ..Config::default() };

    let mut preprocessor = Preprocessor::new(config);
    for definition in &args.defines {
        if let Err(e) = preprocessor.define(definition) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = preprocessor.run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
