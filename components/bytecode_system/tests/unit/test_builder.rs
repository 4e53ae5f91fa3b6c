//! Tests for CodeBuilder

use bytecode_system::{decode_delta, CodeBuilder, Opcode};
use core_types::{ErrorKind, Value};

#[test]
fn test_build_countdown_shape() {
    // f(n): if n == 0 return 0 else tail-call f(n + -1)
    let mut builder = CodeBuilder::new("countdown");
    let zero = builder.add_constant(Value::Int(0));
    let minus_one = builder.add_constant(Value::Int(-1));
    let recurse = builder.new_label();

    builder.emit_with(Opcode::DupNth, 0);
    builder.emit_with(Opcode::LoadConst, zero);
    builder.emit(Opcode::Eq);
    builder.jump_to(Opcode::CondBr, recurse);
    builder.emit_with(Opcode::LoadConst, zero);
    builder.emit(Opcode::Return);
    builder.bind(recurse);
    builder.emit_with(Opcode::DupNth, 1);
    builder.emit_with(Opcode::DupNth, 1);
    builder.emit_with(Opcode::LoadConst, minus_one);
    builder.emit(Opcode::Add);
    builder.emit_with(Opcode::TailCall, 2);

    let code = builder.build().unwrap();
    let words = code.bytecode();
    assert_eq!(words[5], Opcode::CondBr.word());
    // operand at 6, else-branch starts at 10
    assert_eq!(decode_delta(words[6]), 4);
    assert_eq!(words[10], Opcode::DupNth.word());
    assert_eq!(code.consts().len(), 2);
    assert_eq!(code.name(), "countdown");
}

#[test]
fn test_label_bound_twice_is_malformed() {
    let mut builder = CodeBuilder::new("twice");
    let label = builder.new_label();
    builder.bind(label);
    builder.emit(Opcode::Pop);
    builder.bind(label);
    let err = builder.build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedBytecode);
}

#[test]
fn test_emit_jump_rejects_non_jump() {
    let mut builder = CodeBuilder::new("nojump");
    builder.emit_jump(Opcode::Invoke, 3);
    assert_eq!(
        builder.build().unwrap_err().kind(),
        ErrorKind::MalformedBytecode
    );
}

#[test]
fn test_offset_tracks_words() {
    let mut builder = CodeBuilder::new("offsets");
    assert_eq!(builder.offset(), 0);
    builder.emit(Opcode::Pop);
    assert_eq!(builder.offset(), 1);
    builder.emit_with(Opcode::DupNth, 0);
    assert_eq!(builder.offset(), 3);
}
