//! The trampoline driver
//!
//! Pops the top continuation, feeds it the current value and the rest of the
//! stack, and repeats with whatever stack it hands back. The host call stack
//! never grows with the depth of the continuation stack.

use std::sync::Arc;

use core_types::{Value, VmResult};
use tracing::trace;

use crate::continuation::Continuation;
use crate::stack::{stack_cons, Stack};

/// Trampoline driver with step counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trampoline {
    steps: u64,
    reentries: u64,
}

impl Trampoline {
    /// Create a driver with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Continuations called so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Times the stack handed back had a re-entry point on top
    pub fn reentries(&self) -> u64 {
        self.reentries
    }

    /// Run `cont` on `value` with an otherwise empty stack
    pub fn run(&mut self, value: Value, cont: Arc<dyn Continuation>) -> VmResult<Value> {
        self.run_with_stack(value, stack_cons(None, cont))
    }

    /// Run until `stack` is empty, returning the last value produced
    pub fn run_with_stack(&mut self, value: Value, stack: Stack) -> VmResult<Value> {
        let mut value = value;
        let mut stack = stack;

        while let Some(cell) = stack.take() {
            let cont = cell.cont().clone();
            let parent = cell.parent().clone();
            drop(cell);

            trace!(step = self.steps, cont = ?cont, "trampoline step");
            let (next_value, next_stack) = cont.call_continuation(value, parent)?;
            self.steps += 1;
            if next_stack
                .as_ref()
                .is_some_and(|top| top.cont().is_reentry_point())
            {
                self.reentries += 1;
            }

            value = next_value;
            stack = next_stack;
        }
        Ok(value)
    }
}

/// Run `cont` on `value` to completion
pub fn run(value: Value, cont: Arc<dyn Continuation>) -> VmResult<Value> {
    Trampoline::new().run(value, cont)
}

/// Run an existing stack on `value` to completion
pub fn run_with_stack(value: Value, stack: Stack) -> VmResult<Value> {
    Trampoline::new().run_with_stack(value, stack)
}
