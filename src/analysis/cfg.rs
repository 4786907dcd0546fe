//! Control flow view over a procedure.
//!
//! Blocks and instructions live in the IR; the only index the engine
//! precomputes on top of it is the successor list per block, because the
//! fixpoint iterates it on every breadth-first pass. Predecessors are
//! derived from the successor index on demand.

use crate::core::ir::Procedure;
use crate::core::types::{BlockId, InstKind};
use crate::stdlib::Vec;

/// Successor index of a procedure's control-flow graph.
#[derive(Debug)]
pub struct FlowGraph {
    succ: Vec<Vec<BlockId>>,
}

impl FlowGraph {
    /// Build the successor index from the block terminators.
    ///
    /// The procedure builder has already validated that every block ends in
    /// a terminator with in-range targets.
    pub fn build(prog: &Procedure) -> Self {
        let mut succ: Vec<Vec<BlockId>> = crate::stdlib::vec![Vec::new(); prog.block_count()];

        for block in prog.blocks() {
            let insts = prog.block_insts(block);
            let term = insts[insts.len() - 1];
            match prog.inst(term).kind {
                InstKind::Br { dest } => {
                    succ[block.index()].push(dest);
                }
                InstKind::CondBr {
                    then_dest,
                    else_dest,
                    ..
                } => {
                    succ[block.index()].push(then_dest);
                    succ[block.index()].push(else_dest);
                }
                _ => {} // Ret: no successors
            }
        }

        Self { succ }
    }

    /// Successor blocks in terminator order (then edge before else edge).
    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        &self.succ[block.index()]
    }

    /// Predecessor blocks, derived from the successor index.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        let mut preds = Vec::new();
        for (p, successors) in self.succ.iter().enumerate() {
            if successors.contains(&block) {
                preds.push(BlockId(p as u32));
            }
        }
        preds
    }

    /// Whether any block branches to `block`.
    pub fn has_predecessors(&self, block: BlockId) -> bool {
        self.succ.iter().any(|successors| successors.contains(&block))
    }

    /// Number of blocks in the index.
    pub fn block_count(&self) -> usize {
        self.succ.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ir::ProcBuilder;
    use crate::core::types::CmpPred;

    // entry -> (then, else) -> join
    fn diamond() -> (Procedure, [BlockId; 4]) {
        let mut b = ProcBuilder::new("d");
        let entry = BlockId(0);
        let then_b = b.block();
        let else_b = b.block();
        let join = b.block();

        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let c = b.cmp(CmpPred::Lt, x, 0);
        b.cond_br(c, then_b, else_b);
        b.switch_to(then_b);
        b.br(join);
        b.switch_to(else_b);
        b.br(join);
        b.switch_to(join);
        b.ret();

        (b.finish().unwrap(), [entry, then_b, else_b, join])
    }

    #[test]
    fn test_successors() {
        let (prog, [entry, then_b, else_b, join]) = diamond();
        let graph = FlowGraph::build(&prog);

        assert_eq!(graph.successors(entry), &[then_b, else_b]);
        assert_eq!(graph.successors(then_b), &[join]);
        assert_eq!(graph.successors(join), &[] as &[BlockId]);
        assert_eq!(graph.block_count(), 4);
        let _ = else_b;
    }

    #[test]
    fn test_predecessors_derived() {
        let (prog, [entry, then_b, else_b, join]) = diamond();
        let graph = FlowGraph::build(&prog);

        assert_eq!(graph.predecessors(join), crate::stdlib::vec![then_b, else_b]);
        assert_eq!(graph.predecessors(entry), Vec::<BlockId>::new());
        assert!(graph.has_predecessors(then_b));
        assert!(!graph.has_predecessors(entry));
    }
}
