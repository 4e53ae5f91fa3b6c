//! Continuations consumed by the trampoline

use std::fmt;

use core_types::{Value, VmResult};

use crate::stack::Stack;

/// A unit of computation: takes the current value and the rest of the stack,
/// and produces the next value and the stack to continue with.
pub trait Continuation: fmt::Debug + Send + Sync {
    /// Run this continuation
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)>;

    /// Advisory hint that this continuation is a hot re-entry point. Never
    /// affects the value or stack a run produces.
    fn is_reentry_point(&self) -> bool {
        false
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Continuation for Identity {
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)> {
        Ok((value, stack))
    }
}

/// A continuation backed by a closure
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use core_types::{numbers, Value};
/// use trampoline::{run, FnContinuation};
///
/// let inc = FnContinuation::new("inc", |value, stack| {
///     Ok((numbers::add(&value, &Value::Int(1))?, stack))
/// });
/// assert_eq!(run(Value::Int(1), Arc::new(inc)).unwrap(), Value::Int(2));
/// ```
pub struct FnContinuation<F> {
    name: String,
    reentry: bool,
    f: F,
}

impl<F> FnContinuation<F>
where
    F: Fn(Value, Stack) -> VmResult<(Value, Stack)> + Send + Sync,
{
    /// Wrap `f` under a name used in logs
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            reentry: false,
            f,
        }
    }

    /// Mark this continuation as a re-entry point
    pub fn reentry_point(mut self) -> Self {
        self.reentry = true;
        self
    }

    /// The continuation's name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Continuation for FnContinuation<F>
where
    F: Fn(Value, Stack) -> VmResult<(Value, Stack)> + Send + Sync,
{
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)> {
        (self.f)(value, stack)
    }

    fn is_reentry_point(&self) -> bool {
        self.reentry
    }
}

impl<F> fmt::Debug for FnContinuation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnContinuation")
            .field("name", &self.name)
            .field("reentry", &self.reentry)
            .finish()
    }
}
