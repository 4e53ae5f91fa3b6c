//! Code objects and closures.
//!
//! The bytecode and constant pool of a [`CodeObject`] are frozen behind `Arc`
//! slices once built, so frames can cache them without copying.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A unit of compiled bytecode with its constant pool.
pub struct CodeObject {
    name: String,
    bytecode: Arc<[u32]>,
    consts: Arc<[Value]>,
}

impl CodeObject {
    /// Create a code object from raw words and constants
    pub fn new(name: impl Into<String>, bytecode: Vec<u32>, consts: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            bytecode: bytecode.into(),
            consts: consts.into(),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opcode and operand words
    pub fn bytecode(&self) -> &Arc<[u32]> {
        &self.bytecode
    }

    /// Constant pool referenced by LOAD_CONST
    pub fn consts(&self) -> &Arc<[Value]> {
        &self.consts
    }
}

impl fmt::Debug for CodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeObject")
            .field("name", &self.name)
            .field("words", &self.bytecode.len())
            .field("consts", &self.consts.len())
            .finish()
    }
}

/// A code object paired with the values it closed over.
#[derive(Debug)]
pub struct Closure {
    code: Arc<CodeObject>,
    closed_overs: Box<[Value]>,
}

impl Closure {
    /// Combine code with captured values, in capture order
    pub fn new(code: Arc<CodeObject>, closed_overs: Vec<Value>) -> Self {
        Self {
            code,
            closed_overs: closed_overs.into_boxed_slice(),
        }
    }

    /// The wrapped code object
    pub fn code(&self) -> &Arc<CodeObject> {
        &self.code
    }

    /// All captured values
    pub fn closed_overs(&self) -> &[Value] {
        &self.closed_overs
    }

    /// Captured value `idx`, if any
    pub fn closed_over(&self, idx: usize) -> Option<&Value> {
        self.closed_overs.get(idx)
    }
}
