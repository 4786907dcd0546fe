//! Analysis driver.
//!
//! One [`Analyzer`] is constructed per procedure, owns every analysis
//! table for its lifetime, and is discarded afterwards. Hosts that analyze
//! many procedures in parallel construct one analyzer each; nothing is
//! shared.

#[cfg(feature = "std")]
use std::time::Instant;

use crate::analysis::fixpoint::FixpointEngine;
use crate::core::disasm;
use crate::core::error::Result;
use crate::core::ir::Procedure;
use crate::core::log::{AnalyzerLog, LogLevel};
use crate::stdlib::{String, Vec};
use crate::verifier::bounds_check::check_bounds;
use crate::verifier::diagnostics::Diagnostic;
use crate::verifier::limits::{DEFAULT_MAX_LOG_SIZE, MAX_FIXPOINT_PASSES};
use crate::verifier::stats::AnalysisStats;

/// Configuration for one procedure analysis.
#[derive(Debug, Clone)]
pub struct AnalyzerOpts {
    /// Threshold for the analysis log.
    pub log_level: LogLevel,
    /// Upper bound on breadth-first fixpoint passes.
    pub max_passes: usize,
    /// Upper bound on the log buffer size in bytes.
    pub max_log_size: usize,
}

impl Default for AnalyzerOpts {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Off,
            max_passes: MAX_FIXPOINT_PASSES,
            max_log_size: DEFAULT_MAX_LOG_SIZE,
        }
    }
}

/// Result of analyzing one procedure.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Out-of-bounds diagnostics in program order.
    pub diagnostics: Vec<Diagnostic>,
    /// Convergence and pruning counters.
    pub stats: AnalysisStats,
    /// The analysis log (empty unless a level was configured).
    pub log: AnalyzerLog,
}

impl AnalysisReport {
    /// Whether no out-of-bounds access was detected.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Render all diagnostics, one per line (two for locationless ones).
    pub fn render_diagnostics(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            out.push_str(&crate::stdlib::format!("{}\n", diag));
        }
        out
    }
}

/// Per-procedure analyzer: value range fixpoint plus bounds verification.
#[derive(Debug)]
pub struct Analyzer<'a> {
    prog: &'a Procedure,
    opts: AnalyzerOpts,
}

impl<'a> Analyzer<'a> {
    /// Analyzer with default options.
    pub fn new(prog: &'a Procedure) -> Self {
        Self::with_opts(prog, AnalyzerOpts::default())
    }

    /// Analyzer with explicit options.
    pub fn with_opts(prog: &'a Procedure, opts: AnalyzerOpts) -> Self {
        Self { prog, opts }
    }

    /// Run the analysis to completion.
    ///
    /// Returns `Ok` even when diagnostics were emitted; `Err` only for the
    /// fatal structural violations of the supported IR fragment.
    pub fn run(self) -> Result<AnalysisReport> {
        #[cfg(feature = "std")]
        let start = Instant::now();

        let mut log = AnalyzerLog::with_max_size(self.opts.log_level, self.opts.max_log_size);
        if log.enabled(LogLevel::Trace) {
            log.write(LogLevel::Trace, &disasm::fmt_proc(self.prog));
        }

        let mut engine = FixpointEngine::new(self.prog);
        engine.run(&mut log, self.opts.max_passes)?;

        let diagnostics = check_bounds(self.prog, &engine, &mut log);

        let mut stats = engine.stats;
        stats.diagnostics = diagnostics.len();
        #[cfg(feature = "std")]
        {
            stats.analysis_time = start.elapsed();
        }
        if log.enabled(LogLevel::Info) {
            log.write(LogLevel::Info, &stats.summary());
        }

        Ok(AnalysisReport {
            diagnostics,
            stats,
            log,
        })
    }
}

/// Analyze one procedure with default options.
///
/// This is the function-level entry point a host compiler driver calls per
/// procedure.
pub fn analyze_procedure(prog: &Procedure) -> Result<AnalysisReport> {
    Analyzer::new(prog).run()
}
