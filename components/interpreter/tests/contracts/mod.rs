//! Contract tests for interpreter API
//!
//! These tests pin down the public surface other crates build on.

use std::sync::Arc;

use bytecode_system::{CodeBuilder, Opcode, Program};
use core_types::{CodeObject, ErrorKind, Instance, Value, VmError};
use interpreter::{
    interpret, slice_stack, CodeRef, Frame, FrameArena, Interpreter, InterpreterConfig,
    StackSlice, Step, DEFAULT_MAX_DEPTH, OPERAND_STACK_SLOTS,
};

fn constant(value: Value) -> Arc<CodeObject> {
    let mut b = CodeBuilder::new("main");
    b.load_const(value);
    b.emit(Opcode::Return);
    b.build().unwrap()
}

/// interpret() runs code to completion and returns the root's value
#[test]
fn test_interpret_contract() {
    assert_eq!(interpret(constant(Value::Int(42))).unwrap(), Value::Int(42));
}

/// Limits are fixed at 24 operand slots and 10,000 frames by default
#[test]
fn test_limits_contract() {
    assert_eq!(OPERAND_STACK_SLOTS, 24);
    assert_eq!(DEFAULT_MAX_DEPTH, 10_000);
}

/// step() advances one instruction and keeps reporting Done afterwards
#[test]
fn test_step_contract() {
    let mut interp = Interpreter::new(constant(Value::Bool(true)));
    assert_eq!(interp.chain_len(), 1);
    assert_eq!(interp.step().unwrap(), Step::Continue);
    assert_eq!(interp.stats().instructions, 1);
    assert_eq!(interp.step().unwrap(), Step::Done(Value::Bool(true)));
    assert_eq!(interp.result(), Some(&Value::Bool(true)));
    assert_eq!(interp.chain_len(), 0);
}

/// with_config() accepts closures as the root code
#[test]
fn test_with_config_accepts_closure() {
    let mut b = CodeBuilder::new("inner");
    b.emit_with(Opcode::ClosedOver, 0);
    b.emit(Opcode::Return);
    let closure = Arc::new(core_types::Closure::new(
        b.build().unwrap(),
        vec![Value::Int(3)],
    ));

    let mut interp = Interpreter::with_config(closure, InterpreterConfig::default());
    assert_eq!(interp.run().unwrap(), Value::Int(3));
}

/// Errors carry a kind and the location of the failing instruction
#[test]
fn test_error_contract() {
    let mut b = CodeBuilder::new("main");
    b.load_const(Value::Int(1));
    b.load_const(Value::from("x"));
    b.emit(Opcode::Add);
    let err = interpret(b.build().unwrap()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    let location = err.location.unwrap();
    assert_eq!(location.code, "main");
    assert_eq!(location.ip, 4);
}

/// slice_stack() is usable on a bare arena
#[test]
fn test_slice_stack_contract() {
    let token = Instance::handler_token("eff");
    let mut arena = FrameArena::new();
    let root = arena.alloc(Frame::new(CodeRef::from(constant(Value::Nil)), None, 1));
    let handler = arena.alloc(Frame::handler(root, token.clone(), 2));

    let slice = slice_stack(&mut arena, handler, &token).unwrap();
    assert_eq!(
        slice,
        StackSlice {
            handler,
            above: None,
            top: handler,
        }
    );

    let err = slice_stack(&mut arena, root, &token).unwrap_err();
    assert_eq!(
        err,
        VmError::HandlerNotFound {
            token: token.to_string()
        }
    );
}

/// resume() refuses handler frames
#[test]
fn test_resume_rejects_handler_frame() {
    let token = Instance::handler_token("eff");
    let mut interp = Interpreter::new(constant(Value::Nil));
    let root = interp.active_frame().unwrap();
    let handler = interp
        .frames_mut()
        .alloc(Frame::handler(root, token, 2));

    let err = interp.resume(handler, Value::Nil).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalError);
}

/// Programs loaded from JSON run through the interpreter
#[test]
fn test_program_contract() {
    let program = Program::from_json(
        r#"{
            "entry": "main",
            "functions": [
                {
                    "name": "main",
                    "constants": [
                        {"type": "function", "value": "double"},
                        {"type": "int", "value": 21}
                    ],
                    "code": ["LOAD_CONST 0", "LOAD_CONST 1", "INVOKE 2", "RETURN"]
                },
                {
                    "name": "double",
                    "code": ["DUP_NTH 0", "DUP_NTH 1", "ADD", "RETURN"]
                }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(interpret(program.entry().clone()).unwrap(), Value::Int(42));
}
