//! Code builder - assembles bytecode words and a constant pool
//!
//! Jumps may target labels that are bound later; every jump operand is
//! patched when the code object is built.

use std::sync::Arc;

use core_types::{CodeObject, Value, VmError, VmResult};
use tracing::trace;

use crate::opcode::{encode_delta, Opcode};

/// A jump target inside a [`CodeBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(usize);

/// Incrementally builds a [`CodeObject`]
///
/// # Examples
///
/// ```
/// use bytecode_system::{CodeBuilder, Opcode};
/// use core_types::Value;
///
/// let mut builder = CodeBuilder::new("answer");
/// builder.load_const(Value::Int(42));
/// builder.emit(Opcode::Return);
/// let code = builder.build().unwrap();
/// assert_eq!(code.bytecode().len(), 3);
/// ```
#[derive(Debug)]
pub struct CodeBuilder {
    name: String,
    words: Vec<u32>,
    constants: Vec<Value>,
    labels: Vec<Option<usize>>,
    fixups: Vec<(usize, Label)>,
    error: Option<VmError>,
}

impl CodeBuilder {
    /// Create an empty builder for code called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words: Vec::new(),
            constants: Vec::new(),
            labels: Vec::new(),
            fixups: Vec::new(),
            error: None,
        }
    }

    /// Add a constant to the constant pool and return its index
    pub fn add_constant(&mut self, value: Value) -> u32 {
        let idx = self.constants.len() as u32;
        self.constants.push(value);
        idx
    }

    /// Emit an opcode that takes no operand
    pub fn emit(&mut self, op: Opcode) -> &mut Self {
        if op.has_operand() {
            self.fail(format!("{} requires an operand", op));
        }
        self.words.push(op.word());
        self
    }

    /// Emit an opcode followed by its operand word
    pub fn emit_with(&mut self, op: Opcode, operand: u32) -> &mut Self {
        if !op.has_operand() {
            self.fail(format!("{} takes no operand", op));
        }
        self.words.push(op.word());
        self.words.push(operand);
        self
    }

    /// Add `value` to the pool and emit LOAD_CONST for it
    pub fn load_const(&mut self, value: Value) -> &mut Self {
        let idx = self.add_constant(value);
        self.emit_with(Opcode::LoadConst, idx)
    }

    /// Emit a jump with a literal signed delta
    pub fn emit_jump(&mut self, op: Opcode, delta: i32) -> &mut Self {
        if !op.is_jump() {
            self.fail(format!("{} is not a jump", op));
        }
        self.emit_with(op, encode_delta(delta))
    }

    /// Create a label that is not bound to any position yet
    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the current position
    pub fn bind(&mut self, label: Label) -> &mut Self {
        match self.labels.get(label.0).copied() {
            Some(None) => self.labels[label.0] = Some(self.words.len()),
            Some(Some(_)) => self.fail(format!("label {} bound twice", label.0)),
            None => self.fail(format!("label {} does not belong to this builder", label.0)),
        }
        self
    }

    /// Emit a jump to `label`, patched at build time
    pub fn jump_to(&mut self, op: Opcode, label: Label) -> &mut Self {
        self.emit_jump(op, 0);
        let operand_pos = self.words.len() - 1;
        self.fixups.push((operand_pos, label));
        self
    }

    /// Current position in words
    pub fn offset(&self) -> usize {
        self.words.len()
    }

    /// Get the number of constants
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(VmError::MalformedBytecode(message));
        }
    }

    /// Patch jumps and freeze the code object.
    ///
    /// Fails with `MalformedBytecode` on an unbound label or on any misuse
    /// recorded while emitting.
    pub fn build(mut self) -> VmResult<Arc<CodeObject>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        for (operand_pos, label) in &self.fixups {
            let target = self.labels.get(label.0).copied().flatten().ok_or_else(|| {
                VmError::MalformedBytecode(format!(
                    "label {} is never bound in {}",
                    label.0, self.name
                ))
            })?;
            let delta = target as i64 - *operand_pos as i64;
            self.words[*operand_pos] = encode_delta(delta as i32);
        }
        trace!(
            name = %self.name,
            words = self.words.len(),
            consts = self.constants.len(),
            "code built"
        );
        Ok(Arc::new(CodeObject::new(
            self.name,
            self.words,
            self.constants,
        )))
    }
}
