//! Interpreter configuration

/// Default limit on the length of the frame chain
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Tunables for an [`Interpreter`](crate::Interpreter)
///
/// # Examples
///
/// ```
/// use interpreter::InterpreterConfig;
///
/// let config = InterpreterConfig::new().with_max_depth(64);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Deepest frame chain a call or handler install may create
    pub max_depth: usize,
}

impl InterpreterConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the frame-chain depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::new()
    }
}
