//! Runtime orchestration for program execution
//!
//! The Runtime struct coordinates the components:
//! - Program loader for JSON programs
//! - Disassembler for `--print-bytecode`
//! - Interpreter for execution

use std::sync::Arc;

use bytecode_system::{disassemble, Program};
use core_types::Value;
use interpreter::{ExecutionStats, Interpreter, InterpreterConfig};
use tracing::debug;

use crate::error::CliResult;

/// Loads programs and runs them through the interpreter
#[derive(Debug, Default)]
pub struct Runtime {
    /// Interpreter configuration used for every run
    config: InterpreterConfig,
    /// Whether to print bytecode before execution
    print_bytecode: bool,
    /// Whether to print statistics after execution
    print_stats: bool,
    /// Statistics of the most recent run
    last_stats: Option<ExecutionStats>,
}

impl Runtime {
    /// Create a runtime with the default interpreter configuration
    ///
    /// # Example
    /// ```
    /// use loki_cli::Runtime;
    ///
    /// let runtime = Runtime::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for every run
    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable bytecode printing
    pub fn with_print_bytecode(mut self, enabled: bool) -> Self {
        self.print_bytecode = enabled;
        self
    }

    /// Enable statistics printing
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.print_stats = enabled;
        self
    }

    /// Statistics of the most recent successful run
    pub fn last_stats(&self) -> Option<&ExecutionStats> {
        self.last_stats.as_ref()
    }

    /// Execute a program file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read, loaded or run
    ///
    /// # Example
    /// ```no_run
    /// use loki_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new();
    /// let result = runtime.execute_file("countdown.json").unwrap();
    /// ```
    pub fn execute_file(&mut self, path: &str) -> CliResult<Value> {
        let source = std::fs::read_to_string(path)?;
        self.execute_string(&source)
    }

    /// Execute a program given as JSON
    ///
    /// # Errors
    /// Returns `CliError` if loading or execution fails
    ///
    /// # Example
    /// ```
    /// use loki_cli::Runtime;
    /// use core_types::Value;
    ///
    /// let mut runtime = Runtime::new();
    /// let result = runtime
    ///     .execute_string(r#"{
    ///         "entry": "main",
    ///         "functions": [{
    ///             "name": "main",
    ///             "constants": [{"type": "int", "value": 42}],
    ///             "code": ["LOAD_CONST 0", "RETURN"]
    ///         }]
    ///     }"#)
    ///     .unwrap();
    /// assert_eq!(result, Value::Int(42));
    /// ```
    pub fn execute_string(&mut self, source: &str) -> CliResult<Value> {
        let program = Program::from_json(source)?;
        core_types::set_namespaces(program.namespaces().clone());

        if self.print_bytecode {
            for name in program.function_names() {
                if let Some(code) = program.function(name) {
                    println!("{}", disassemble(code));
                }
            }
        }

        let mut interp =
            Interpreter::with_config(Arc::clone(program.entry()), self.config.clone());
        let result = interp.run()?;
        debug!(
            instructions = interp.stats().instructions,
            peak_depth = interp.stats().peak_depth,
            "run complete"
        );

        if self.print_stats {
            println!("{}", interp.stats());
        }
        self.last_stats = Some(interp.stats().clone());
        Ok(result)
    }
}
