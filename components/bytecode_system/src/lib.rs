//! Bytecode system for the Loki VM
//!
//! This crate provides the opcode set, a code builder with labels, a
//! disassembler and a JSON program loader.
//!
//! # Features
//!
//! - Word-encoded stack-machine bytecode
//! - Forward and backward jump labels
//! - Human-readable listings
//! - Loading whole programs from JSON
//!
//! # Example
//!
//! ```
//! use bytecode_system::{disassemble, CodeBuilder, Opcode};
//! use core_types::Value;
//!
//! let mut builder = CodeBuilder::new("main");
//! builder.load_const(Value::Int(40));
//! builder.load_const(Value::Int(2));
//! builder.emit(Opcode::Add);
//! builder.emit(Opcode::Return);
//!
//! let code = builder.build().unwrap();
//! assert!(disassemble(&code).contains("ADD"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod disasm;
pub mod opcode;
pub mod program;

// Re-export main types at crate root
pub use builder::{CodeBuilder, Label};
pub use disasm::{disassemble, disassemble_words};
pub use opcode::{decode_delta, encode_delta, Opcode};
pub use program::{assemble, ConstantSpec, FunctionSpec, Program, ProgramError, ProgramSpec};
