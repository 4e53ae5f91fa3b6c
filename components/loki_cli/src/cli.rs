//! Command-line arguments

use clap::Parser;

/// Run a Loki VM program
#[derive(Parser, Debug)]
#[command(name = "loki")]
#[command(about = "Run a Loki VM bytecode program", version)]
pub struct Cli {
    /// Program file (JSON) to execute
    #[arg(short, long, conflicts_with = "eval")]
    pub file: Option<String>,

    /// Inline program (JSON) to execute
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Frame-chain depth limit
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Print the disassembly of every function before running
    #[arg(long)]
    pub print_bytecode: bool,

    /// Print execution statistics after running
    #[arg(long)]
    pub stats: bool,

    /// Log frame-level events
    #[arg(short, long)]
    pub verbose: bool,
}
