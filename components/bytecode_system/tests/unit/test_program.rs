//! Tests for the JSON program loader

use bytecode_system::{Opcode, Program, ProgramError};
use core_types::{TypeId, Value};

const TWO_FUNCTIONS: &str = r#"{
    "entry": "main",
    "functions": [
        { "name": "main",
          "constants": [
            { "type": "function", "value": "inc" },
            { "type": "int", "value": 41 }
          ],
          "code": [ "LOAD_CONST 0", "LOAD_CONST 1", "INVOKE 2", "RETURN" ] },
        { "name": "inc",
          "constants": [ { "type": "int", "value": 1 } ],
          "code": [ "DUP_NTH 0", "LOAD_CONST 0", "ADD", "RETURN" ] }
    ]
}"#;

#[test]
fn test_load_program_with_function_constant() {
    let program = Program::from_json(TWO_FUNCTIONS).unwrap();
    assert_eq!(program.entry().name(), "main");
    assert_eq!(program.function_names(), vec!["inc", "main"]);

    let inc = program.function("inc").unwrap();
    match &program.entry().consts()[0] {
        Value::Code(code) => assert!(std::sync::Arc::ptr_eq(code, inc)),
        other => panic!("expected code constant, got {:?}", other),
    }
    assert_eq!(program.entry().bytecode()[4], Opcode::Invoke.word());
}

#[test]
fn test_missing_entry() {
    let err = Program::from_json(r#"{ "entry": "nope", "functions": [] }"#).unwrap_err();
    assert!(matches!(err, ProgramError::UnknownFunction(name) if name == "nope"));
}

#[test]
fn test_duplicate_function() {
    let json = r#"{ "entry": "f", "functions": [
        { "name": "f", "code": ["RETURN"] },
        { "name": "f", "code": ["RETURN"] } ] }"#;
    assert!(matches!(
        Program::from_json(json).unwrap_err(),
        ProgramError::DuplicateFunction(_)
    ));
}

#[test]
fn test_function_cycle_rejected() {
    let json = r#"{ "entry": "a", "functions": [
        { "name": "a", "constants": [ { "type": "function", "value": "b" } ], "code": ["RETURN"] },
        { "name": "b", "constants": [ { "type": "function", "value": "a" } ], "code": ["RETURN"] } ] }"#;
    assert!(matches!(
        Program::from_json(json).unwrap_err(),
        ProgramError::CyclicReference(_)
    ));
}

#[test]
fn test_self_reference_rejected() {
    let json = r#"{ "entry": "a", "functions": [
        { "name": "a", "constants": [ { "type": "function", "value": "a" } ], "code": ["RETURN"] } ] }"#;
    assert!(matches!(
        Program::from_json(json).unwrap_err(),
        ProgramError::CyclicReference(name) if name == "a"
    ));
}

#[test]
fn test_vars_tokens_and_types() {
    let json = r#"{ "entry": "main", "functions": [
        { "name": "main",
          "constants": [
            { "type": "var", "value": "user/x" },
            { "type": "var", "value": "user/x" },
            { "type": "token", "value": "eff" },
            { "type": "token", "value": "eff" },
            { "type": "token", "value": "other" },
            { "type": "type", "value": "loki.core.Integer" }
          ],
          "code": [ "RETURN" ] } ] }"#;
    let program = Program::from_json(json).unwrap();
    let consts = program.entry().consts();

    assert!(consts[0].identical(&consts[1]));
    assert!(consts[2].identical(&consts[3]));
    assert!(!consts[2].identical(&consts[4]));
    assert!(consts[2].identical(program.token("eff").unwrap()));
    assert_eq!(consts[5], Value::Type(TypeId::INTEGER));
    assert_eq!(program.namespaces().namespace_names(), vec!["user"]);
}

#[test]
fn test_unknown_type_constant() {
    let json = r#"{ "entry": "main", "functions": [
        { "name": "main",
          "constants": [ { "type": "type", "value": "no.such.Type" } ],
          "code": [ "RETURN" ] } ] }"#;
    assert!(matches!(
        Program::from_json(json).unwrap_err(),
        ProgramError::UnknownType(_)
    ));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        Program::from_json("{ not json").unwrap_err(),
        ProgramError::Json(_)
    ));
}
