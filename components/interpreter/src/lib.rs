//! Bytecode interpreter for the Loki VM
//!
//! This crate provides the execution core:
//! - Frames with bounded operand stacks, owned by a generation-checked arena
//! - A calling convention with ordinary calls and constant-space tail calls
//! - Effect-handler frames and stack slicing for delimited continuations
//! - A step-wise dispatch loop with execution statistics
//!
//! # Example
//!
//! ```
//! use bytecode_system::{CodeBuilder, Opcode};
//! use core_types::Value;
//! use interpreter::{Interpreter, Step};
//!
//! let mut builder = CodeBuilder::new("main");
//! builder.load_const(Value::Int(42));
//! builder.emit(Opcode::Return);
//!
//! let mut interp = Interpreter::new(builder.build().unwrap());
//! assert_eq!(interp.step().unwrap(), Step::Continue);
//! assert_eq!(interp.step().unwrap(), Step::Done(Value::Int(42)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod call;
pub mod call_frame;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod profile;

// Re-export main types at crate root
pub use arena::{Chain, FrameArena, FrameId};
pub use call::{CodeRef, Invoke};
pub use call_frame::{Frame, OPERAND_STACK_SLOTS};
pub use config::{InterpreterConfig, DEFAULT_MAX_DEPTH};
pub use dispatch::{interpret, Interpreter, Step};
pub use handler::{slice_stack, StackSlice};
pub use profile::ExecutionStats;
