//! Execution statistics
//!
//! Counters collected by the dispatch loop while a program runs.

use std::fmt;

/// Execution statistics for one interpreter run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Instructions dispatched
    pub instructions: u64,
    /// Frames pushed by INVOKE and INSTALL
    pub calls: u64,
    /// Frames replaced by TAIL_CALL
    pub tail_calls: u64,
    /// Frames popped by RETURN
    pub returns: u64,
    /// Handler frames created by INSTALL
    pub handlers_installed: u64,
    /// Deepest frame chain observed
    pub peak_depth: usize,
}

impl ExecutionStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dispatched instruction
    pub fn record_instruction(&mut self) {
        self.instructions += 1;
    }

    /// Record that a frame at `depth` became active
    pub fn record_depth(&mut self, depth: usize) {
        self.peak_depth = self.peak_depth.max(depth);
    }
}

impl fmt::Display for ExecutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instructions:       {}", self.instructions)?;
        writeln!(f, "calls:              {}", self.calls)?;
        writeln!(f, "tail calls:         {}", self.tail_calls)?;
        writeln!(f, "returns:            {}", self.returns)?;
        writeln!(f, "handlers installed: {}", self.handlers_installed)?;
        write!(f, "peak depth:         {}", self.peak_depth)
    }
}
