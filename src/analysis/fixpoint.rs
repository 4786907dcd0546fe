//! Fixpoint engine.
//!
//! Runs the monotone dataflow computation to convergence: breadth-first
//! passes over the blocks from the entry, merging reachable incoming edge
//! environments at each block entry, threading the environment through the
//! block's instructions, and writing the refined environments onto the
//! outgoing edges at the terminator.
//!
//! The recorded per-instruction environment is widened against its previous
//! recording whenever it would change, which bounds the number of change
//! events per variable and guarantees convergence even for loops whose
//! induction variables would otherwise ascend forever. A pass that changes
//! no entry, no edge, and no recording is the fixpoint.

use bitflags::bitflags;

use crate::analysis::cfg::FlowGraph;
use crate::analysis::transfer;
use crate::core::error::{AnalyzerError, Result};
use crate::core::ir::Procedure;
use crate::core::log::{log_pruned_edge, log_transfer, AnalyzerLog, LogLevel};
use crate::core::types::{BlockId, InstKind, ValueId};
use crate::state::env::Env;
use crate::stdlib::{BTreeMap, BTreeSet, VecDeque};
use crate::verifier::stats::AnalysisStats;

bitflags! {
    /// What changed during one breadth-first pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PassChange: u32 {
        /// A block entry environment was updated.
        const BLOCK_ENTRY = 1 << 0;
        /// An edge environment was written or rewritten.
        const EDGE = 1 << 1;
        /// A per-instruction environment recording changed.
        const INST = 1 << 2;
    }
}

/// The fixpoint engine and its result tables.
///
/// All tables are built fresh for one procedure and consumed by the bounds
/// verifier once [`FixpointEngine::run`] has converged.
#[derive(Debug)]
pub struct FixpointEngine<'a> {
    prog: &'a Procedure,
    graph: FlowGraph,
    entry_env: BTreeMap<BlockId, Env>,
    edge_env: BTreeMap<(BlockId, BlockId), Env>,
    after_env: BTreeMap<ValueId, Env>,
    /// Counters exposed to the analysis report.
    pub stats: AnalysisStats,
}

impl<'a> FixpointEngine<'a> {
    /// Set up the engine for one procedure; builds the successor index.
    pub fn new(prog: &'a Procedure) -> Self {
        let graph = FlowGraph::build(prog);
        let stats = AnalysisStats {
            block_count: prog.block_count(),
            inst_count: prog.inst_count(),
            ..Default::default()
        };
        Self {
            prog,
            graph,
            entry_env: BTreeMap::new(),
            edge_env: BTreeMap::new(),
            after_env: BTreeMap::new(),
            stats,
        }
    }

    /// The successor index the engine iterates.
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Iterate breadth-first passes until nothing changes.
    pub fn run(&mut self, log: &mut AnalyzerLog, max_passes: usize) -> Result<()> {
        loop {
            if self.stats.passes >= max_passes {
                return Err(AnalyzerError::PassLimitExceeded(max_passes));
            }
            self.stats.passes += 1;

            let changes = self.run_pass(log)?;
            if log.enabled(LogLevel::Debug) {
                log.write(
                    LogLevel::Debug,
                    &crate::stdlib::format!("pass {} changes: {:?}", self.stats.passes, changes),
                );
            }
            if changes.is_empty() {
                return Ok(());
            }
        }
    }

    fn run_pass(&mut self, log: &mut AnalyzerLog) -> Result<PassChange> {
        let mut changes = PassChange::empty();
        let entry = self.prog.entry();

        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();
        queue.push_back(entry);
        visited.insert(entry);

        while let Some(block) = queue.pop_front() {
            for &succ in self.graph.successors(block) {
                if visited.insert(succ) {
                    queue.push_back(succ);
                }
            }

            // Merge of the reachable incoming edges; the entry starts from
            // the empty environment. A block none of whose incoming edges
            // is reachable yet is skipped this pass.
            let candidate = if block == entry {
                Env::new()
            } else {
                match self.incoming_env(block) {
                    Some(env) => env,
                    None => {
                        self.stats.blocks_skipped += 1;
                        continue;
                    }
                }
            };

            if self.entry_env.get(&block) != Some(&candidate) {
                self.entry_env.insert(block, candidate.clone());
                changes |= PassChange::BLOCK_ENTRY;
                self.stats.entry_updates += 1;
            }

            let mut env = candidate;
            for &v in self.prog.block_insts(block) {
                transfer::apply(self.prog, v, &mut env)?;
                log_transfer(log, self.prog, v, &env);
                env = self.record(v, env, &mut changes);

                match &self.prog.inst(v).kind {
                    InstKind::Br { dest } => {
                        let dest = *dest;
                        self.write_edge(block, dest, env.clone(), &mut changes);
                    }
                    InstKind::CondBr {
                        cond,
                        then_dest,
                        else_dest,
                    } => {
                        let (cond, then_dest, else_dest) = (*cond, *then_dest, *else_dest);
                        let branches = transfer::branch_envs(self.prog, cond, &env)?;
                        match branches.then_env {
                            Some(refined) => {
                                self.write_edge(block, then_dest, refined, &mut changes)
                            }
                            None => {
                                self.stats.edges_pruned += 1;
                                log_pruned_edge(log, block, then_dest);
                            }
                        }
                        match branches.else_env {
                            Some(refined) => {
                                self.write_edge(block, else_dest, refined, &mut changes)
                            }
                            None => {
                                self.stats.edges_pruned += 1;
                                log_pruned_edge(log, block, else_dest);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(changes)
    }

    // Merge the environments of the reachable incoming edges, or None when
    // no incoming edge carries an environment yet.
    fn incoming_env(&self, block: BlockId) -> Option<Env> {
        let mut merged: Option<Env> = None;
        for pred in self.graph.predecessors(block) {
            if let Some(env) = self.edge_env.get(&(pred, block)) {
                merged = Some(match merged {
                    None => env.clone(),
                    Some(acc) => acc.merge(env),
                });
            }
        }
        merged
    }

    // Record Env_after(v), widening against the previous recording when the
    // value changed. Returns the environment to thread onward, which is the
    // recorded one.
    fn record(&mut self, v: ValueId, env: Env, changes: &mut PassChange) -> Env {
        match self.after_env.get(&v) {
            Some(prev) if *prev == env => env,
            Some(prev) => {
                let widened = env.clone().widened_from(prev);
                if widened != env {
                    self.stats.widenings += 1;
                }
                self.after_env.insert(v, widened.clone());
                *changes |= PassChange::INST;
                self.stats.inst_updates += 1;
                widened
            }
            None => {
                self.after_env.insert(v, env.clone());
                *changes |= PassChange::INST;
                self.stats.inst_updates += 1;
                env
            }
        }
    }

    fn write_edge(&mut self, from: BlockId, to: BlockId, env: Env, changes: &mut PassChange) {
        if self.edge_env.get(&(from, to)) != Some(&env) {
            self.edge_env.insert((from, to), env);
            *changes |= PassChange::EDGE;
            self.stats.edge_updates += 1;
        }
    }

    /// The environment recorded immediately after `v`, if its block was
    /// reached.
    pub fn env_after(&self, v: ValueId) -> Option<&Env> {
        self.after_env.get(&v)
    }

    /// The environment in force immediately before `v`: the recording of
    /// its predecessor in the block, or the block entry environment for the
    /// block's first instruction.
    pub fn env_before(&self, v: ValueId) -> Option<&Env> {
        match self.prog.prev_in_block(v) {
            Some(prev) => self.after_env.get(&prev),
            None => {
                let (block, _) = self.prog.position_of(v);
                self.entry_env.get(&block)
            }
        }
    }

    /// The merged entry environment of `block`, if it was ever reachable.
    pub fn entry_env(&self, block: BlockId) -> Option<&Env> {
        self.entry_env.get(&block)
    }

    /// The environment stored on edge `(from, to)`, if the edge is
    /// reachable.
    pub fn edge_env(&self, from: BlockId, to: BlockId) -> Option<&Env> {
        self.edge_env.get(&(from, to))
    }

    /// Whether the analyzer concluded edge `(from, to)` can be taken.
    pub fn edge_reachable(&self, from: BlockId, to: BlockId) -> bool {
        self.edge_env.contains_key(&(from, to))
    }
}
