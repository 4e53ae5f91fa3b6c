//! Continuation-passing trampoline for the Loki VM.
//!
//! Evaluates recursive computations iteratively over an immutable, shareable
//! stack of [`Continuation`]s, independent of bytecode.
//!
//! # Overview
//!
//! - [`Continuation`] - One step of a computation
//! - [`StackCell`] / [`Stack`] - Persistent continuation stack
//! - [`Trampoline`] / [`run`] - The driver loop
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use core_types::Value;
//! use trampoline::{run_with_stack, stack_cons, Identity};
//!
//! let stack = stack_cons(stack_cons(None, Arc::new(Identity)), Arc::new(Identity));
//! assert_eq!(run_with_stack(Value::Int(5), stack).unwrap(), Value::Int(5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod continuation;
mod run;
mod stack;

pub use continuation::{Continuation, FnContinuation, Identity};
pub use run::{run, run_with_stack, Trampoline};
pub use stack::{depth, stack_cons, Stack, StackCell};
