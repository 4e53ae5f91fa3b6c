//! Call frame for the frame chain
//!
//! A frame owns a bounded operand stack and an instruction pointer into its
//! code object. Frames are linked to their caller by [`FrameId`], never by
//! direct ownership, so the chain can be cut and re-linked freely.

use std::sync::Arc;

use arrayvec::ArrayVec;
use core_types::{Value, VmError, VmResult};

use crate::arena::FrameId;
use crate::call::CodeRef;

/// Capacity of every frame's operand stack
pub const OPERAND_STACK_SLOTS: usize = 24;

/// Call frame representing one activation
///
/// Cloning copies only the live stack slots.
#[derive(Debug, Clone)]
pub struct Frame {
    code: Option<CodeRef>,
    stack: ArrayVec<Value, OPERAND_STACK_SLOTS>,
    ip: usize,
    bytecode: Arc<[u32]>,
    consts: Arc<[Value]>,
    argc: usize,
    caller: Option<FrameId>,
    handler: Option<Value>,
    depth: usize,
}

impl Frame {
    /// Create a frame running `code`, linked to `caller`
    pub fn new(code: CodeRef, caller: Option<FrameId>, depth: usize) -> Self {
        let object = code.code_object();
        let bytecode = object.bytecode().clone();
        let consts = object.consts().clone();
        Self {
            code: Some(code),
            stack: ArrayVec::new(),
            ip: 0,
            bytecode,
            consts,
            argc: 0,
            caller,
            handler: None,
            depth,
        }
    }

    /// Create the codeless frame that marks an effect-handler boundary
    pub fn handler(caller: FrameId, token: Value, depth: usize) -> Self {
        Self {
            code: None,
            stack: ArrayVec::new(),
            ip: 0,
            bytecode: Arc::from(Vec::new()),
            consts: Arc::from(Vec::new()),
            argc: 0,
            caller: Some(caller),
            handler: Some(token),
            depth,
        }
    }

    /// The code this frame runs; `None` for handler frames
    pub fn code(&self) -> Option<&CodeRef> {
        self.code.as_ref()
    }

    /// Name used in diagnostics
    pub fn code_name(&self) -> &str {
        self.code.as_ref().map_or("<handler>", CodeRef::name)
    }

    /// Stack pointer: number of live slots
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    /// Live slots, bottom first
    pub fn slots(&self) -> &[Value] {
        &self.stack
    }

    /// Instruction pointer
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Slots consumed by the call that created this frame
    pub fn argc(&self) -> usize {
        self.argc
    }

    pub(crate) fn set_argc(&mut self, argc: usize) {
        self.argc = argc;
    }

    /// The frame to resume on return
    pub fn caller(&self) -> Option<FrameId> {
        self.caller
    }

    pub(crate) fn set_caller(&mut self, caller: Option<FrameId>) {
        self.caller = caller;
    }

    /// Handler token, set only on handler frames
    pub fn handler_token(&self) -> Option<&Value> {
        self.handler.as_ref()
    }

    /// Check if this frame marks a handler boundary
    pub fn is_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Position in the chain; the root frame is at depth 1
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push a value onto the operand stack
    pub fn push(&mut self, value: Value) -> VmResult<()> {
        self.stack
            .try_push(value)
            .map_err(|_| VmError::StackOverflow {
                capacity: OPERAND_STACK_SLOTS,
            })
    }

    /// Pop the top value
    pub fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    /// Value `delta` slots below the top, without popping
    pub fn nth(&self, delta: usize) -> VmResult<&Value> {
        let sp = self.stack.len();
        if delta >= sp {
            return Err(VmError::StackUnderflow);
        }
        Ok(&self.stack[sp - delta - 1])
    }

    /// Push a copy of the value `delta` slots below the top
    pub fn push_nth(&mut self, delta: usize) -> VmResult<()> {
        let value = self.nth(delta)?.clone();
        self.push(value)
    }

    /// Pop `n` values, top first
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        if n > self.stack.len() {
            return Err(VmError::StackUnderflow);
        }
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            values.push(self.pop()?);
        }
        Ok(values)
    }

    /// Push values produced by [`pop_n`](Self::pop_n), restoring their order
    pub fn push_n(&mut self, values: Vec<Value>) -> VmResult<()> {
        for value in values.into_iter().rev() {
            self.push(value)?;
        }
        Ok(())
    }

    /// Discard the `argc` argument slots
    pub fn pop_args(&mut self) -> VmResult<()> {
        for _ in 0..self.argc {
            self.pop()?;
        }
        Ok(())
    }

    /// Push constant `idx` of the frame's code
    pub fn push_const(&mut self, idx: usize) -> VmResult<()> {
        let value = self.consts.get(idx).cloned().ok_or_else(|| {
            VmError::MalformedBytecode(format!(
                "constant {} out of range ({} constants)",
                idx,
                self.consts.len()
            ))
        })?;
        self.push(value)
    }

    /// Read the word at the instruction pointer and advance
    pub fn fetch(&mut self) -> VmResult<u32> {
        let word = self.bytecode.get(self.ip).copied().ok_or_else(|| {
            VmError::MalformedBytecode(format!(
                "instruction pointer {} out of range ({} words)",
                self.ip,
                self.bytecode.len()
            ))
        })?;
        self.ip += 1;
        Ok(word)
    }

    /// Jump relative to the operand word just fetched
    pub fn jump_rel(&mut self, delta: i32) -> VmResult<()> {
        let target = self.ip as i64 - 1 + delta as i64;
        if target < 0 || target > self.bytecode.len() as i64 {
            return Err(VmError::MalformedBytecode(format!(
                "jump target {} out of range ({} words)",
                target,
                self.bytecode.len()
            )));
        }
        self.ip = target as usize;
        Ok(())
    }
}
