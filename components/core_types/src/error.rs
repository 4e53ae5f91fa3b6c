//! VM error types and error handling.
//!
//! Every failure the execution core can raise is a [`VmError`]. Each variant
//! belongs to exactly one [`ErrorKind`], which is the taxonomy hosts match on.
//! None of these are caught inside the interpreter loop; they propagate to
//! the host entry point wrapped in an [`InterpretError`] that remembers where
//! execution stopped.

use std::fmt;

use thiserror::Error;

/// The kind of VM error.
///
/// Several [`VmError`] variants may share a kind (operand-stack overflow and
/// call-depth overflow are both [`ErrorKind::StackOverflow`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand stack capacity or frame-chain depth limit exceeded
    StackOverflow,
    /// Pop from an empty operand stack
    StackUnderflow,
    /// INVOKE/TAIL_CALL/INSTALL target is not a code object
    NotCallable,
    /// Operand of the wrong type (non-Var, non-Closure, non-number, ...)
    TypeMismatch,
    /// `deref` of a Var that was never set
    UnboundVar,
    /// `slice_stack` found no frame carrying the token
    HandlerNotFound,
    /// Opcode word not known to this interpreter
    UnknownOpcode,
    /// Out-of-range operands, instruction pointers or unbound labels
    MalformedBytecode,
    /// Internal engine error (programming error, never recoverable)
    InternalError,
}

/// An error raised by the execution core.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, VmError};
///
/// let err = VmError::UnboundVar { name: "user/x".to_string() };
/// assert_eq!(err.kind(), ErrorKind::UnboundVar);
/// assert_eq!(err.to_string(), "var user/x is unbound");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    /// Push onto a full operand stack
    #[error("operand stack overflow: all {capacity} slots in use")]
    StackOverflow {
        /// Capacity of the operand stack
        capacity: usize,
    },
    /// A call would make the frame chain deeper than the configured limit
    #[error("call depth limit of {limit} frames exceeded")]
    CallDepthExceeded {
        /// Configured maximum chain depth
        limit: usize,
    },
    /// Pop from an empty operand stack
    #[error("operand stack underflow")]
    StackUnderflow,
    /// Call target lacks the code capability
    #[error("{found} is not callable")]
    NotCallable {
        /// Rendering of the offending value
        found: String,
    },
    /// Operand of the wrong type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the operation needed
        expected: &'static str,
        /// Rendering of what it got
        found: String,
    },
    /// Var read before its first `set_root`
    #[error("var {name} is unbound")]
    UnboundVar {
        /// Qualified name of the Var
        name: String,
    },
    /// No handler frame in the chain carries the token
    #[error("no handler installed for token {token}")]
    HandlerNotFound {
        /// Rendering of the token searched for
        token: String,
    },
    /// Opcode word not understood by this interpreter
    #[error("unknown opcode {0}")]
    UnknownOpcode(u32),
    /// Bytecode references something that does not exist
    #[error("malformed bytecode: {0}")]
    MalformedBytecode(String),
    /// Internal invariant broken
    #[error("internal error: {0}")]
    Internal(String),
}

impl VmError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VmError::StackOverflow { .. } | VmError::CallDepthExceeded { .. } => {
                ErrorKind::StackOverflow
            }
            VmError::StackUnderflow => ErrorKind::StackUnderflow,
            VmError::NotCallable { .. } => ErrorKind::NotCallable,
            VmError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            VmError::UnboundVar { .. } => ErrorKind::UnboundVar,
            VmError::HandlerNotFound { .. } => ErrorKind::HandlerNotFound,
            VmError::UnknownOpcode(_) => ErrorKind::UnknownOpcode,
            VmError::MalformedBytecode(_) => ErrorKind::MalformedBytecode,
            VmError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Shorthand for a [`VmError::TypeMismatch`] naming the offending value.
    pub fn type_mismatch(expected: &'static str, found: impl fmt::Display) -> Self {
        VmError::TypeMismatch {
            expected,
            found: found.to_string(),
        }
    }
}

/// Result type for fallible VM operations
pub type VmResult<T> = Result<T, VmError>;

/// Where in the bytecode an error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    /// Name of the failing frame's code object
    pub code: String,
    /// Instruction pointer of the failing opcode
    pub ip: usize,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.code, self.ip)
    }
}

/// An error that escaped the dispatch loop, with its location when known.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error} (at {})", .location.as_ref().map_or("<no frame>".to_string(), ToString::to_string))]
pub struct InterpretError {
    /// The underlying error
    #[source]
    pub error: VmError,
    /// Failing frame's code object and instruction pointer
    pub location: Option<ErrorLocation>,
}

impl InterpretError {
    /// Returns the taxonomy kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl From<VmError> for InterpretError {
    fn from(error: VmError) -> Self {
        InterpretError {
            error,
            location: None,
        }
    }
}
