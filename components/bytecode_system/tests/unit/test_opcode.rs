//! Tests for Opcode decoding and mnemonics

use bytecode_system::Opcode;
use core_types::{ErrorKind, VmError};

#[test]
fn test_mnemonic_lookup_round_trips() {
    for op in Opcode::ALL {
        assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
    }
}

#[test]
fn test_mnemonic_lookup_ignores_case() {
    assert_eq!(Opcode::from_mnemonic("tail_call"), Some(Opcode::TailCall));
    assert_eq!(Opcode::from_mnemonic("Dup_Nth"), Some(Opcode::DupNth));
    assert_eq!(Opcode::from_mnemonic("CALL"), None);
}

#[test]
fn test_operand_table() {
    let with_operand = [
        Opcode::LoadConst,
        Opcode::Invoke,
        Opcode::TailCall,
        Opcode::DupNth,
        Opcode::CondBr,
        Opcode::Jmp,
        Opcode::MakeClosure,
        Opcode::ClosedOver,
    ];
    for op in Opcode::ALL {
        assert_eq!(op.has_operand(), with_operand.contains(&op), "{}", op);
    }
}

#[test]
fn test_unknown_opcode_kind() {
    let err = Opcode::from_word(1000).unwrap_err();
    assert_eq!(err, VmError::UnknownOpcode(1000));
    assert_eq!(err.kind(), ErrorKind::UnknownOpcode);
}

#[test]
fn test_display_is_mnemonic() {
    assert_eq!(Opcode::MakeClosure.to_string(), "MAKE_CLOSURE");
    assert_eq!(format!("{:<8}|", Opcode::Eq), "EQ      |");
}
