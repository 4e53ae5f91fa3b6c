//! Calling convention
//!
//! A call consumes `slots` values from the caller's operand stack: the callee
//! itself, pushed first, followed by its arguments. The new frame receives
//! the same values in the same order and remembers `slots` as its `argc`, so
//! RETURN can discard them.

use std::sync::Arc;

use core_types::{Closure, CodeObject, Value, VmError, VmResult};

use crate::arena::{FrameArena, FrameId};
use crate::call_frame::Frame;

/// Anything with the code capability
#[derive(Debug, Clone)]
pub enum CodeRef {
    /// A plain code object
    Code(Arc<CodeObject>),
    /// A code object with captured values
    Closure(Arc<Closure>),
}

impl CodeRef {
    /// View `value` as callable code, or fail with `NotCallable`
    pub fn from_value(value: &Value) -> VmResult<CodeRef> {
        match value {
            Value::Code(code) => Ok(CodeRef::Code(code.clone())),
            Value::Closure(closure) => Ok(CodeRef::Closure(closure.clone())),
            other => Err(VmError::NotCallable {
                found: other.to_string(),
            }),
        }
    }

    /// The underlying code object
    pub fn code_object(&self) -> &Arc<CodeObject> {
        match self {
            CodeRef::Code(code) => code,
            CodeRef::Closure(closure) => closure.code(),
        }
    }

    /// The closure, if this is one
    pub fn closure(&self) -> Option<&Arc<Closure>> {
        match self {
            CodeRef::Closure(closure) => Some(closure),
            CodeRef::Code(_) => None,
        }
    }

    /// Name of the underlying code object
    pub fn name(&self) -> &str {
        self.code_object().name()
    }

    /// Back to a plain value
    pub fn to_value(&self) -> Value {
        match self {
            CodeRef::Code(code) => Value::Code(code.clone()),
            CodeRef::Closure(closure) => Value::Closure(closure.clone()),
        }
    }
}

impl From<Arc<CodeObject>> for CodeRef {
    fn from(code: Arc<CodeObject>) -> Self {
        CodeRef::Code(code)
    }
}

impl From<Arc<Closure>> for CodeRef {
    fn from(closure: Arc<Closure>) -> Self {
        CodeRef::Closure(closure)
    }
}

/// The two ways of entering code
pub trait Invoke {
    /// Call from `caller`, pushing a new frame on top of it
    fn invoke(&self, frames: &mut FrameArena, caller: FrameId, slots: usize) -> VmResult<FrameId>;

    /// Call from `caller`, replacing it; the chain does not grow
    fn tail_call(
        &self,
        frames: &mut FrameArena,
        caller: FrameId,
        slots: usize,
    ) -> VmResult<FrameId>;
}

fn check_slots(slots: usize) -> VmResult<()> {
    if slots == 0 {
        return Err(VmError::MalformedBytecode(
            "a call needs at least one slot for the callee".to_string(),
        ));
    }
    Ok(())
}

impl Invoke for CodeRef {
    fn invoke(&self, frames: &mut FrameArena, caller: FrameId, slots: usize) -> VmResult<FrameId> {
        check_slots(slots)?;
        let limit = frames.max_depth();
        let caller_frame = frames.get_mut(caller)?;
        let depth = caller_frame.depth() + 1;
        if depth > limit {
            return Err(VmError::CallDepthExceeded { limit });
        }
        let args = caller_frame.pop_n(slots)?;

        let mut frame = Frame::new(self.clone(), Some(caller), depth);
        frame.push_n(args)?;
        frame.set_argc(slots);
        Ok(frames.alloc(frame))
    }

    fn tail_call(
        &self,
        frames: &mut FrameArena,
        caller: FrameId,
        slots: usize,
    ) -> VmResult<FrameId> {
        check_slots(slots)?;
        let caller_frame = frames.get_mut(caller)?;
        let args = caller_frame.pop_n(slots)?;
        let depth = caller_frame.depth();
        let grand_caller = caller_frame.caller();
        frames.free(caller)?;

        let mut frame = Frame::new(self.clone(), grand_caller, depth);
        frame.push_n(args)?;
        frame.set_argc(slots);
        Ok(frames.alloc(frame))
    }
}
