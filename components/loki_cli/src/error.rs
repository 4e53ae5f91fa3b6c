//! Error types for the CLI

use bytecode_system::ProgramError;
use core_types::InterpretError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Program file could not be read
    #[error("file error: {0}")]
    IoError(#[from] std::io::Error),

    /// Program JSON could not be loaded
    #[error("load error: {0}")]
    ProgramError(#[from] ProgramError),

    /// Execution stopped with an error
    #[error("runtime error: {0}")]
    InterpretError(#[from] InterpretError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
