//! Post-fixpoint bounds verification.
//!
//! Once the fixpoint has converged, every array indexing instruction is
//! checked against the element count of its base allocation using the
//! interval facts in force just before it. Only provably unsafe accesses
//! are reported: an unknown index can be in range, so it is not.

use crate::analysis::fixpoint::FixpointEngine;
use crate::bounds::interval::Interval;
use crate::core::disasm;
use crate::core::ir::Procedure;
use crate::core::log::{AnalyzerLog, LogLevel};
use crate::core::types::{InstKind, Operand, ValueId};
use crate::stdlib::{BTreeMap, Vec};
use crate::verifier::diagnostics::Diagnostic;

/// Element counts of the procedure's static array allocations.
#[derive(Debug, Default)]
pub struct ArraySizes {
    sizes: BTreeMap<ValueId, u32>,
}

impl ArraySizes {
    /// Read the allocation sizes off the IR.
    pub fn collect(prog: &Procedure) -> Self {
        let mut sizes = BTreeMap::new();
        for v in prog.insts_in_order() {
            if let InstKind::AllocArray { len } = prog.inst(v).kind {
                sizes.insert(v, len);
            }
        }
        Self { sizes }
    }

    /// Element count of `alloc`, if it is a tracked static array.
    pub fn get(&self, alloc: ValueId) -> Option<u32> {
        self.sizes.get(&alloc).copied()
    }

    /// Number of tracked allocations.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the procedure allocates no static arrays.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Scan the procedure for provably out-of-bounds indexing and produce the
/// diagnostics in program order.
pub fn check_bounds(
    prog: &Procedure,
    engine: &FixpointEngine<'_>,
    log: &mut AnalyzerLog,
) -> Vec<Diagnostic> {
    let sizes = ArraySizes::collect(prog);
    let mut diagnostics = Vec::new();

    for v in prog.insts_in_order() {
        let (base, index) = match prog.inst(v).kind {
            InstKind::ElemAddr { base, index } => (base, index),
            _ => continue,
        };

        // Never recorded: the block is unreachable under the analysis.
        if engine.env_after(v).is_none() {
            continue;
        }

        // Only statically sized allocations are checked.
        let len = match sizes.get(base) {
            Some(len) => len,
            None => continue,
        };

        let interval = match index {
            Operand::Const(c) => Interval::constant(c),
            Operand::Value(idx) => engine
                .env_before(v)
                .and_then(|env| env.get(idx))
                .unwrap_or_else(Interval::top),
        };

        if interval.is_out_of_range(len) {
            let diag = Diagnostic {
                loc: prog.inst(v).loc.clone(),
                inst_text: disasm::fmt_inst(prog, v),
            };
            log.write(LogLevel::Warn, &crate::stdlib::format!("{}", diag));
            diagnostics.push(diag);
        }
    }

    diagnostics
}
