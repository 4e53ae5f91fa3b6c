//! Human-readable listing of code objects

use std::fmt::Write;

use core_types::{CodeObject, Value};

use crate::opcode::{decode_delta, Opcode};

/// Render `code` one instruction per line.
///
/// Each line holds the word offset, the mnemonic and the operand. LOAD_CONST
/// also shows the constant and jumps show their absolute target. Words that
/// do not decode are listed rather than rejected.
pub fn disassemble(code: &CodeObject) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", code.name());
    disassemble_words(&mut out, code.bytecode(), code.consts());
    out
}

/// Append the listing of raw `words` with constant pool `consts` to `out`.
pub fn disassemble_words(out: &mut String, words: &[u32], consts: &[Value]) {
    let mut ip = 0;
    while ip < words.len() {
        let word = words[ip];
        let op = match Opcode::from_word(word) {
            Ok(op) => op,
            Err(_) => {
                let _ = writeln!(out, "{:04} <unknown {}>", ip, word);
                ip += 1;
                continue;
            }
        };

        if !op.has_operand() {
            let _ = writeln!(out, "{:04} {}", ip, op);
            ip += 1;
            continue;
        }

        let Some(&operand) = words.get(ip + 1) else {
            let _ = writeln!(out, "{:04} {:<12} <missing operand>", ip, op);
            break;
        };
        match op {
            Opcode::LoadConst => match consts.get(operand as usize) {
                Some(value) => {
                    let _ = writeln!(out, "{:04} {:<12} {} ; {}", ip, op, operand, value);
                }
                None => {
                    let _ = writeln!(out, "{:04} {:<12} {} ; <out of range>", ip, op, operand);
                }
            },
            Opcode::CondBr | Opcode::Jmp => {
                let delta = decode_delta(operand);
                let target = (ip + 1) as i64 + delta as i64;
                let _ = writeln!(out, "{:04} {:<12} {:+} -> {:04}", ip, op, delta, target);
            }
            _ => {
                let _ = writeln!(out, "{:04} {:<12} {}", ip, op, operand);
            }
        }
        ip += 2;
    }
}
