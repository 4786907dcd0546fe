//! Analysis statistics and metrics
//!
//! Counters collected while a procedure is analyzed, giving the host
//! insight into convergence behavior and how much pruning and widening
//! the fixpoint needed.

#[cfg(feature = "std")]
use std::time::Duration;

use crate::stdlib::String;

/// Statistics collected during one procedure analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisStats {
    /// Number of basic blocks in the procedure
    pub block_count: usize,
    /// Number of instructions in the procedure
    pub inst_count: usize,
    /// Breadth-first passes until the fixpoint converged
    pub passes: usize,
    /// Block entry environments updated
    pub entry_updates: u64,
    /// Edge environments written or rewritten
    pub edge_updates: u64,
    /// Per-instruction environments recorded or re-recorded
    pub inst_updates: u64,
    /// Recordings where widening actually inflated a bound
    pub widenings: u64,
    /// Blocks skipped because no incoming edge was reachable yet
    pub blocks_skipped: u64,
    /// Infeasible branch edges observed (per pass, so re-observations count)
    pub edges_pruned: u64,
    /// Out-of-bounds diagnostics emitted
    pub diagnostics: usize,
    /// Wall-clock analysis duration
    #[cfg(feature = "std")]
    pub analysis_time: Duration,
}

impl AnalysisStats {
    /// One-line summary for the analysis log
    pub fn summary(&self) -> String {
        crate::stdlib::format!(
            "{} blocks, {} insts, {} passes, {} widenings, {} pruned edges, {} diagnostics",
            self.block_count,
            self.inst_count,
            self.passes,
            self.widenings,
            self.edges_pruned,
            self.diagnostics
        )
    }
}
