//! Interpreter + Trampoline Integration Tests
//!
//! Drives bytecode functions from continuations, so values produced by the
//! interpreter flow through the trampoline's persistent stack.

use std::sync::Arc;

use bytecode_system::{assemble, CodeBuilder, Opcode};
use core_types::{CodeObject, ErrorKind, Value, VmResult};
use interpreter::interpret;
use trampoline::{depth, stack_cons, Continuation, Stack, Trampoline};

/// Applies a one-argument bytecode function to the current value
#[derive(Debug)]
struct Apply(Arc<CodeObject>);

impl Continuation for Apply {
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)> {
        let mut b = CodeBuilder::new("apply");
        b.load_const(Value::Code(self.0.clone()));
        b.load_const(value);
        b.emit_with(Opcode::Invoke, 2);
        b.emit(Opcode::Return);
        let result = interpret(b.build()?).map_err(|e| e.error)?;
        Ok((result, stack))
    }
}

fn add_code(n: i64) -> Arc<CodeObject> {
    let lines: Vec<String> = ["DUP_NTH 0", "LOAD_CONST 0", "ADD", "RETURN"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assemble("add", &lines, vec![Value::Int(n)]).unwrap()
}

/// Test: A stack of bytecode calls runs top to bottom
#[test]
fn test_stack_of_bytecode_calls() {
    let add_one: Arc<dyn Continuation> = Arc::new(Apply(add_code(1)));
    let mut stack = None;
    for _ in 0..1_000 {
        stack = stack_cons(stack, add_one.clone());
    }
    assert_eq!(depth(&stack), 1_000);

    let mut t = Trampoline::new();
    assert_eq!(t.run_with_stack(Value::Int(0), stack).unwrap(), Value::Int(1_000));
    assert_eq!(t.steps(), 1_000);
}

/// Test: Shared suffixes are reusable across runs
#[test]
fn test_shared_suffix_reused() {
    let tail = stack_cons(None, Arc::new(Apply(add_code(100))) as Arc<dyn Continuation>);
    let a = stack_cons(tail.clone(), Arc::new(Apply(add_code(1))));
    let b = stack_cons(tail.clone(), Arc::new(Apply(add_code(2))));

    let mut t = Trampoline::new();
    assert_eq!(t.run_with_stack(Value::Int(0), a).unwrap(), Value::Int(101));
    assert_eq!(t.run_with_stack(Value::Int(0), b).unwrap(), Value::Int(102));
    assert_eq!(t.run_with_stack(Value::Int(0), tail).unwrap(), Value::Int(100));
}

/// Test: Interpreter errors abort the trampoline run
#[test]
fn test_interpreter_error_propagates() {
    let stack = stack_cons(
        stack_cons(None, Arc::new(Apply(add_code(1))) as Arc<dyn Continuation>),
        Arc::new(Apply(add_code(1))),
    );
    let err = Trampoline::new()
        .run_with_stack(Value::from("one"), stack)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}
