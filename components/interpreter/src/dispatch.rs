//! Dispatch loop for bytecode execution
//!
//! The loop is a plain state machine over the frame arena: every step
//! fetches one opcode from the active frame and either stays in it, moves to
//! a new frame (INVOKE, TAIL_CALL, INSTALL) or back to a caller (RETURN).
//! No Rust recursion happens per guest call, so guest call depth is bounded
//! only by [`InterpreterConfig::max_depth`].

use std::sync::Arc;

use bytecode_system::{decode_delta, Opcode};
use core_types::{
    numbers, Closure, CodeObject, ErrorLocation, InterpretError, Value, VmError, VmResult,
};
use tracing::{debug, info, trace};

use crate::arena::{FrameArena, FrameId};
use crate::call::{CodeRef, Invoke};
use crate::call_frame::Frame;
use crate::config::InterpreterConfig;
use crate::handler::{self, StackSlice};
use crate::profile::ExecutionStats;

/// Outcome of a single [`Interpreter::step`]
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// More instructions remain
    Continue,
    /// The root frame returned this value
    Done(Value),
}

/// Bytecode interpreter for one program run
#[derive(Debug)]
pub struct Interpreter {
    frames: FrameArena,
    active: Option<FrameId>,
    result: Option<Value>,
    stats: ExecutionStats,
}

impl Interpreter {
    /// Create an interpreter whose root frame runs `code`
    pub fn new(code: Arc<CodeObject>) -> Self {
        Self::with_config(code, InterpreterConfig::default())
    }

    /// Create an interpreter with explicit configuration
    pub fn with_config(code: impl Into<CodeRef>, config: InterpreterConfig) -> Self {
        let mut frames = FrameArena::with_max_depth(config.max_depth);
        let root = frames.alloc(Frame::new(code.into(), None, 1));
        let mut stats = ExecutionStats::new();
        stats.record_depth(1);
        Self {
            frames,
            active: Some(root),
            result: None,
            stats,
        }
    }

    /// The frame that will execute the next instruction
    pub fn active_frame(&self) -> Option<FrameId> {
        self.active
    }

    /// Borrow a frame
    pub fn frame(&self, id: FrameId) -> VmResult<&Frame> {
        self.frames.get(id)
    }

    /// The frame arena
    pub fn frames(&self) -> &FrameArena {
        &self.frames
    }

    /// Mutable access to the frame arena, for hosts managing sliced chains
    pub fn frames_mut(&mut self) -> &mut FrameArena {
        &mut self.frames
    }

    /// Length of the active frame chain
    pub fn chain_len(&self) -> usize {
        self.active.map_or(0, |top| self.frames.chain_len(top))
    }

    /// Statistics collected so far
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// The final value, once the root frame has returned
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Cut the active chain above the handler frame tagged with `token`
    pub fn slice_stack(&mut self, token: &Value) -> VmResult<StackSlice> {
        let top = self.active.ok_or_else(no_active_frame)?;
        handler::slice_stack(&mut self.frames, top, token)
    }

    /// Push `value` onto `frame` and make it the active frame
    pub fn resume(&mut self, frame: FrameId, value: Value) -> VmResult<()> {
        let target = self.frames.get_mut(frame)?;
        if target.code().is_none() {
            return Err(VmError::Internal(format!(
                "cannot resume handler frame {}",
                frame
            )));
        }
        target.push(value)?;
        let depth = target.depth();
        self.active = Some(frame);
        self.stats.record_depth(depth);
        Ok(())
    }

    /// Execute exactly one instruction
    pub fn step(&mut self) -> Result<Step, InterpretError> {
        let Some(id) = self.active else {
            return match &self.result {
                Some(value) => Ok(Step::Done(value.clone())),
                None => Err(no_active_frame().into()),
            };
        };
        let ip = self.frames.get(id).map(Frame::ip).unwrap_or_default();

        self.execute(id).map_err(|error| {
            let code = self
                .frames
                .get(id)
                .map_or_else(|_| "<freed frame>".to_string(), |f| f.code_name().to_string());
            InterpretError {
                error,
                location: Some(ErrorLocation { code, ip }),
            }
        })
    }

    /// Run until the root frame returns
    pub fn run(&mut self) -> Result<Value, InterpretError> {
        if let Some(id) = self.active {
            if let Ok(frame) = self.frames.get(id) {
                info!(code = %frame.code_name(), "interpretation started");
            }
        }
        loop {
            if let Step::Done(value) = self.step()? {
                return Ok(value);
            }
        }
    }

    fn execute(&mut self, id: FrameId) -> VmResult<Step> {
        let frame = self.frames.get_mut(id)?;
        let op = Opcode::from_word(frame.fetch()?)?;
        trace!(code = %frame.code_name(), ip = frame.ip() - 1, op = %op, sp = frame.sp(), "dispatch");
        self.stats.record_instruction();

        match op {
            Opcode::LoadConst => {
                let idx = frame.fetch()?;
                frame.push_const(idx as usize)?;
            }
            Opcode::Add => {
                let b = frame.pop()?;
                let a = frame.pop()?;
                frame.push(numbers::add(&a, &b)?)?;
            }
            Opcode::Eq => {
                let b = frame.pop()?;
                let a = frame.pop()?;
                frame.push(numbers::eq(&a, &b))?;
            }
            Opcode::Install => {
                let depth = frame.depth() + 1;
                self.install(id, depth)?;
            }
            Opcode::Invoke => {
                let slots = frame.fetch()? as usize;
                let callee = callee_at(frame, slots)?;
                let new = callee.invoke(&mut self.frames, id, slots)?;
                self.stats.calls += 1;
                self.enter(new)?;
            }
            Opcode::TailCall => {
                let slots = frame.fetch()? as usize;
                let callee = callee_at(frame, slots)?;
                let new = callee.tail_call(&mut self.frames, id, slots)?;
                debug!(callee = %callee.name(), slots, "tail call");
                self.stats.tail_calls += 1;
                self.enter(new)?;
            }
            Opcode::DupNth => {
                let delta = frame.fetch()?;
                frame.push_nth(delta as usize)?;
            }
            Opcode::Return => return self.do_return(id),
            Opcode::CondBr => {
                let cond = frame.pop()?;
                let delta = decode_delta(frame.fetch()?);
                if !cond.is_truthy() {
                    frame.jump_rel(delta)?;
                }
            }
            Opcode::Jmp => {
                let delta = decode_delta(frame.fetch()?);
                frame.jump_rel(delta)?;
            }
            Opcode::MakeClosure => {
                let argc = frame.fetch()? as usize;
                let mut captures = frame.pop_n(argc)?;
                captures.reverse();
                let closure = match frame.pop()? {
                    Value::Code(code) => Closure::new(code, captures),
                    other => return Err(VmError::type_mismatch("code", other)),
                };
                frame.push(Value::Closure(Arc::new(closure)))?;
            }
            Opcode::ClosedOver => {
                let idx = frame.fetch()? as usize;
                let closure = frame
                    .code()
                    .and_then(CodeRef::closure)
                    .ok_or_else(|| VmError::type_mismatch("closure", frame.code_name()))?;
                let value = closure.closed_over(idx).cloned().ok_or_else(|| {
                    VmError::MalformedBytecode(format!(
                        "closed-over index {} out of range ({} captures)",
                        idx,
                        closure.closed_overs().len()
                    ))
                })?;
                frame.push(value)?;
            }
            Opcode::SetVar => {
                let value = frame.pop()?;
                let var = frame.pop()?;
                var.as_var()?.set_root(value);
                frame.push(var)?;
            }
            Opcode::Pop => {
                frame.pop()?;
            }
            Opcode::DerefVar => {
                let var = frame.pop()?;
                let value = var.as_var()?.deref()?;
                frame.push(value)?;
            }
        }
        Ok(Step::Continue)
    }

    /// Operands stay on the caller until both the token and the body check out
    fn install(&mut self, caller: FrameId, depth: usize) -> VmResult<()> {
        let limit = self.frames.max_depth();
        let frame = self.frames.get_mut(caller)?;
        frame.nth(1)?;
        let callee = CodeRef::from_value(frame.nth(0)?)?;
        // the body runs one level above the handler frame
        if depth + 1 > limit {
            return Err(VmError::CallDepthExceeded { limit });
        }
        let func = frame.pop()?;
        let token = frame.pop()?;

        let mut host = Frame::handler(caller, token, depth);
        host.push(func)?;
        let host = self.frames.alloc(host);
        let new = callee.invoke(&mut self.frames, host, 1)?;

        debug!(callee = %callee.name(), depth, "handler installed");
        self.stats.handlers_installed += 1;
        self.stats.calls += 1;
        self.enter(new)
    }

    fn enter(&mut self, id: FrameId) -> VmResult<()> {
        let depth = self.frames.get(id)?.depth();
        self.stats.record_depth(depth);
        self.active = Some(id);
        Ok(())
    }

    fn do_return(&mut self, id: FrameId) -> VmResult<Step> {
        let frame = self.frames.get_mut(id)?;
        let value = frame.pop()?;
        frame.pop_args()?;
        let caller = self.frames.free(id)?.caller();
        self.stats.returns += 1;

        let Some(mut resume) = caller else {
            self.active = None;
            self.result = Some(value.clone());
            info!(
                instructions = self.stats.instructions,
                peak_depth = self.stats.peak_depth,
                "interpretation finished"
            );
            return Ok(Step::Done(value));
        };

        if self.frames.get(resume)?.is_handler() {
            let host = self.frames.free(resume)?;
            resume = host.caller().ok_or_else(|| {
                VmError::Internal("handler frame has no caller to return to".to_string())
            })?;
        }
        self.frames.get_mut(resume)?.push(value)?;
        self.active = Some(resume);
        Ok(Step::Continue)
    }
}

fn callee_at(frame: &Frame, slots: usize) -> VmResult<CodeRef> {
    let depth = slots.checked_sub(1).ok_or_else(|| {
        VmError::MalformedBytecode("a call needs at least one slot for the callee".to_string())
    })?;
    CodeRef::from_value(frame.nth(depth)?)
}

fn no_active_frame() -> VmError {
    VmError::Internal("no active frame".to_string())
}

/// Run `code` to completion with the default configuration
///
/// # Examples
///
/// ```
/// use bytecode_system::{CodeBuilder, Opcode};
/// use core_types::Value;
/// use interpreter::interpret;
///
/// let mut builder = CodeBuilder::new("main");
/// builder.load_const(Value::Int(40));
/// builder.load_const(Value::Int(2));
/// builder.emit(Opcode::Add);
/// builder.emit(Opcode::Return);
///
/// assert_eq!(interpret(builder.build().unwrap()).unwrap(), Value::Int(42));
/// ```
pub fn interpret(code: Arc<CodeObject>) -> Result<Value, InterpretError> {
    Interpreter::new(code).run()
}
