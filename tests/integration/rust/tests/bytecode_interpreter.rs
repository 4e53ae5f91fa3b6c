//! Bytecode System + Interpreter Integration Tests
//!
//! Builds code with CodeBuilder and the text assembler, checks the
//! disassembly, and runs the result through the interpreter.

use std::sync::Arc;

use bytecode_system::{assemble, disassemble, CodeBuilder, Opcode};
use core_types::{CodeObject, ErrorKind, Value};
use interpreter::{interpret, Interpreter, Step};

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}

/// Returns argument `nth_from_top` of a two-argument call
fn pick_code(nth_from_top: u32) -> Arc<CodeObject> {
    // stack: [pick, a, b]
    assemble(
        "pick",
        &lines(&[format!("DUP_NTH {}", nth_from_top).as_str(), "RETURN"]),
        vec![],
    )
    .unwrap()
}

fn call(f: Arc<CodeObject>, args: &[Value]) -> Arc<CodeObject> {
    let mut b = CodeBuilder::new("main");
    b.load_const(Value::Code(f));
    for arg in args {
        b.load_const(arg.clone());
    }
    b.emit_with(Opcode::Invoke, args.len() as u32 + 1);
    b.emit(Opcode::Return);
    b.build().unwrap()
}

/// Test: Builder output runs and disassembles consistently
#[test]
fn test_built_code_disassembles_and_runs() {
    let mut b = CodeBuilder::new("main");
    let skip = b.new_label();
    b.load_const(Value::Bool(false));
    b.jump_to(Opcode::CondBr, skip);
    b.load_const(Value::Int(1));
    b.emit(Opcode::Return);
    b.bind(skip);
    b.load_const(Value::Int(2));
    b.emit(Opcode::Return);
    let code = b.build().unwrap();

    let listing = disassemble(&code);
    assert!(listing.contains("0002 COND_BR      +4 -> 0007"), "{}", listing);
    assert!(listing.contains("0007 LOAD_CONST   2 ; 2"), "{}", listing);

    assert_eq!(interpret(code).unwrap(), Value::Int(2));
}

/// Test: Assembled and built code behave the same
#[test]
fn test_assembler_matches_builder() {
    let assembled = assemble(
        "main",
        &lines(&["LOAD_CONST 0", "LOAD_CONST 1", "ADD", "RETURN"]),
        vec![Value::Int(20), Value::Int(22)],
    )
    .unwrap();

    let mut b = CodeBuilder::new("main");
    b.load_const(Value::Int(20));
    b.load_const(Value::Int(22));
    b.emit(Opcode::Add);
    b.emit(Opcode::Return);
    let built = b.build().unwrap();

    assert_eq!(assembled.bytecode(), built.bytecode());
    assert_eq!(interpret(assembled).unwrap(), interpret(built).unwrap());
}

/// Test: Arguments arrive in push order
#[test]
fn test_argument_order() {
    let args = [Value::Int(5), Value::Int(9)];
    assert_eq!(interpret(call(pick_code(0), &args)).unwrap(), Value::Int(9));
    assert_eq!(interpret(call(pick_code(1), &args)).unwrap(), Value::Int(5));
    assert!(matches!(
        interpret(call(pick_code(2), &args)).unwrap(),
        Value::Code(_)
    ));
}

/// Test: Integer overflow promotes instead of wrapping
#[test]
fn test_add_promotes_on_overflow() {
    let code = assemble(
        "main",
        &lines(&["LOAD_CONST 0", "LOAD_CONST 1", "ADD", "LOAD_CONST 1", "ADD", "RETURN"]),
        vec![Value::Int(i64::MAX), Value::Int(1)],
    )
    .unwrap();
    let result = interpret(code).unwrap();
    assert!(matches!(result, Value::BigInt(_)), "{:?}", result);
}

/// Test: Float arithmetic and equality across the number tower
#[test]
fn test_mixed_number_equality() {
    let code = assemble(
        "main",
        &lines(&["LOAD_CONST 0", "LOAD_CONST 1", "ADD", "LOAD_CONST 2", "EQ", "RETURN"]),
        vec![Value::Float(1.5), Value::Float(1.5), Value::Float(3.0)],
    )
    .unwrap();
    assert_eq!(interpret(code).unwrap(), Value::Bool(true));
}

/// Test: Unknown opcode words surface as a fatal error
#[test]
fn test_corrupt_bytecode() {
    let code = Arc::new(CodeObject::new("corrupt", vec![Opcode::Pop.word() + 100], vec![]));
    assert!(disassemble(&code).contains("<unknown"));
    assert_eq!(interpret(code).unwrap_err().kind(), ErrorKind::UnknownOpcode);
}

/// Test: Stepping visits every dispatched instruction
#[test]
fn test_stepping_counts_instructions() {
    let code = call(pick_code(1), &[Value::Int(1), Value::Int(2)]);
    let mut interp = Interpreter::new(code);
    let mut steps = 0;
    loop {
        steps += 1;
        if let Step::Done(value) = interp.step().unwrap() {
            assert_eq!(value, Value::Int(1));
            break;
        }
    }
    assert_eq!(steps as u64, interp.stats().instructions);
}
