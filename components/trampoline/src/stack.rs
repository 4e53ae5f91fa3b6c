//! Persistent continuation stack
//!
//! A stack is a chain of immutable cons cells. Pushing never touches the
//! existing cells, so any number of stacks may share a common tail.

use std::fmt;
use std::sync::Arc;

use crate::continuation::Continuation;

/// An immutable stack; `None` is the empty stack
pub type Stack = Option<Arc<StackCell>>;

/// One continuation on top of the rest of a stack
pub struct StackCell {
    cont: Arc<dyn Continuation>,
    parent: Stack,
}

impl StackCell {
    /// The continuation in this cell
    pub fn cont(&self) -> &Arc<dyn Continuation> {
        &self.cont
    }

    /// The stack below this cell
    pub fn parent(&self) -> &Stack {
        &self.parent
    }
}

/// Push `cont` on top of `stack`
pub fn stack_cons(stack: Stack, cont: Arc<dyn Continuation>) -> Stack {
    Some(Arc::new(StackCell {
        cont,
        parent: stack,
    }))
}

/// Number of cells in `stack`
pub fn depth(stack: &Stack) -> usize {
    let mut count = 0;
    let mut current = stack.as_deref();
    while let Some(cell) = current {
        count += 1;
        current = cell.parent.as_deref();
    }
    count
}

impl Drop for StackCell {
    // Unlink uniquely owned tails one cell at a time so that dropping a deep
    // stack does not recurse.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(cell) = next {
            match Arc::try_unwrap(cell) {
                Ok(mut cell) => next = cell.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for StackCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackCell")
            .field("cont", &self.cont)
            .field("parent_depth", &depth(&self.parent))
            .finish()
    }
}
