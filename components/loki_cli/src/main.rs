//! Loki VM CLI
//!
//! Entry point for the `loki` binary. Parses CLI arguments and delegates to
//! the Runtime for execution.

use clap::Parser as ClapParser;
use interpreter::InterpreterConfig;
use loki_cli::{Cli, CliError, Runtime};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(err: CliError, source: &str) -> ! {
    match err {
        CliError::IoError(e) => {
            eprintln!("Error: Could not read file '{}': {}", source, e);
        }
        CliError::ProgramError(e) => {
            eprintln!("Load Error: {}", e);
        }
        CliError::InterpretError(e) => {
            eprintln!("Runtime Error [{:?}]: {}", e.kind(), e);
        }
    }
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = InterpreterConfig::new();
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }
    let mut runtime = Runtime::new()
        .with_config(config)
        .with_print_bytecode(cli.print_bytecode)
        .with_stats(cli.stats);

    let outcome = if let Some(file) = &cli.file {
        runtime.execute_file(file).map_err(|e| (e, file.as_str()))
    } else if let Some(program) = &cli.eval {
        runtime.execute_string(program).map_err(|e| (e, "<eval>"))
    } else {
        // Default: show usage
        println!("Loki VM v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage:");
        println!("  loki --file <FILE>     Execute a JSON program file");
        println!("  loki --eval <JSON>     Execute an inline JSON program");
        println!();
        println!("Run 'loki --help' for more options.");
        return;
    };

    match outcome {
        Ok(value) => println!("{}", value),
        Err((err, source)) => report(err, source),
    }
}
