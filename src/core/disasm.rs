//! IR disassembler
//!
//! Renders instructions and whole procedures into a stable textual form.
//! The bounds verifier uses it for diagnostics on procedures compiled
//! without debug info, and the trace log uses it for per-transfer output.

use crate::core::ir::Procedure;
use crate::core::types::{InstKind, ValueId};
use crate::stdlib::String;
use core::fmt::Write;

/// Format a single instruction.
pub fn fmt_inst(prog: &Procedure, value: ValueId) -> String {
    let mut s = String::new();

    match &prog.inst(value).kind {
        InstKind::AllocScalar => {
            write!(s, "{} = alloca i32", value).unwrap();
        }
        InstKind::AllocArray { len } => {
            write!(s, "{} = alloca [{} x i32]", value, len).unwrap();
        }
        InstKind::Load { ptr } => {
            write!(s, "{} = load {}", value, ptr).unwrap();
        }
        InstKind::Store { value: v, ptr } => {
            write!(s, "store {}, {}", v, ptr).unwrap();
        }
        InstKind::BinOp { op, lhs, rhs } => {
            write!(s, "{} = {} {}, {}", value, op.mnemonic(), lhs, rhs).unwrap();
        }
        InstKind::Cmp { pred, lhs, rhs } => {
            write!(s, "{} = cmp {} {}, {}", value, pred.mnemonic(), lhs, rhs).unwrap();
        }
        InstKind::ElemAddr { base, index } => {
            write!(s, "{} = index {}, {}", value, base, index).unwrap();
        }
        InstKind::Call { callee } => {
            write!(s, "{} = call {}", value, callee).unwrap();
        }
        InstKind::Cast { value: v } => {
            write!(s, "{} = cast {}", value, v).unwrap();
        }
        InstKind::Br { dest } => {
            write!(s, "br {}", dest).unwrap();
        }
        InstKind::CondBr {
            cond,
            then_dest,
            else_dest,
        } => {
            write!(s, "condbr {}, {}, {}", cond, then_dest, else_dest).unwrap();
        }
        InstKind::Ret { value: Some(v) } => {
            write!(s, "ret {}", v).unwrap();
        }
        InstKind::Ret { value: None } => {
            s.push_str("ret");
        }
    }

    s
}

/// Format a whole procedure, one block per paragraph.
pub fn fmt_proc(prog: &Procedure) -> String {
    let mut s = String::new();

    writeln!(s, "proc {}:", prog.name()).unwrap();
    for block in prog.blocks() {
        writeln!(s, "{}:", block).unwrap();
        for &v in prog.block_insts(block) {
            writeln!(s, "  {}", fmt_inst(prog, v)).unwrap();
        }
    }

    s
}
