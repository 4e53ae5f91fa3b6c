//! Bytecode opcodes for the Loki VM
//!
//! Code is a flat array of `u32` words. Every instruction is one opcode word,
//! optionally followed by a single inline operand word.

use std::fmt;

use core_types::{VmError, VmResult};

/// Bytecode opcodes for the stack machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Push constant at the operand index
    LoadConst = 0,
    /// Pop b, pop a, push a + b
    Add,
    /// Pop b, pop a, push a == b
    Eq,
    /// Pop fn, pop handler, run fn under a fresh handler frame
    Install,
    /// Call the callee found `slots - 1` below the top
    Invoke,
    /// Like Invoke, but replaces the current frame
    TailCall,
    /// Push a copy of the value at the operand depth
    DupNth,
    /// Return the top value to the caller
    Return,
    /// Pop a condition and jump by the operand delta when it is falsy
    CondBr,
    /// Jump by the operand delta
    Jmp,
    /// Pop operand-many captures and a code object, push a closure
    MakeClosure,
    /// Push capture at the operand index of the running closure
    ClosedOver,
    /// Pop value, pop var, set the var's root, push the var
    SetVar,
    /// Discard the top value
    Pop,
    /// Pop var, push its current root
    DerefVar,
}

impl Opcode {
    /// Every opcode, in encoding order
    pub const ALL: [Opcode; 15] = [
        Opcode::LoadConst,
        Opcode::Add,
        Opcode::Eq,
        Opcode::Install,
        Opcode::Invoke,
        Opcode::TailCall,
        Opcode::DupNth,
        Opcode::Return,
        Opcode::CondBr,
        Opcode::Jmp,
        Opcode::MakeClosure,
        Opcode::ClosedOver,
        Opcode::SetVar,
        Opcode::Pop,
        Opcode::DerefVar,
    ];

    /// Decode an opcode word
    pub fn from_word(word: u32) -> VmResult<Opcode> {
        Opcode::ALL
            .get(word as usize)
            .copied()
            .ok_or(VmError::UnknownOpcode(word))
    }

    /// The opcode word for this opcode
    pub fn word(self) -> u32 {
        self as u32
    }

    /// Check if this opcode is followed by an inline operand word
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            Opcode::LoadConst
                | Opcode::Invoke
                | Opcode::TailCall
                | Opcode::DupNth
                | Opcode::CondBr
                | Opcode::Jmp
                | Opcode::MakeClosure
                | Opcode::ClosedOver
        )
    }

    /// Check if the operand is a signed relative jump delta
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::CondBr | Opcode::Jmp)
    }

    /// Check if this opcode never falls through to the next instruction
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Return | Opcode::Jmp | Opcode::TailCall)
    }

    /// Assembler name of this opcode
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::Add => "ADD",
            Opcode::Eq => "EQ",
            Opcode::Install => "INSTALL",
            Opcode::Invoke => "INVOKE",
            Opcode::TailCall => "TAIL_CALL",
            Opcode::DupNth => "DUP_NTH",
            Opcode::Return => "RETURN",
            Opcode::CondBr => "COND_BR",
            Opcode::Jmp => "JMP",
            Opcode::MakeClosure => "MAKE_CLOSURE",
            Opcode::ClosedOver => "CLOSED_OVER",
            Opcode::SetVar => "SET_VAR",
            Opcode::Pop => "POP",
            Opcode::DerefVar => "DEREF_VAR",
        }
    }

    /// Look an opcode up by mnemonic, ignoring ASCII case
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

/// Encode a signed jump delta as an operand word (two's complement).
pub fn encode_delta(delta: i32) -> u32 {
    delta as u32
}

/// Decode an operand word as a signed jump delta.
pub fn decode_delta(word: u32) -> i32 {
    word as i32
}
