//! Analysis logging
//!
//! The analyzer is a library embedded in a host compiler driver and must
//! stay usable without the standard library, so log output accumulates in a
//! bounded in-memory buffer the host drains after the analysis instead of
//! going through a global logger.

use crate::bounds::interval::Interval;
use crate::core::ir::Procedure;
use crate::core::types::{BlockId, ValueId};
use crate::state::env::Env;
use crate::stdlib::String;
use core::fmt::Write;

/// Verbosity threshold for analyzer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// No output at all.
    #[default]
    Off,
    /// Fatal analysis failures.
    Error,
    /// Out-of-bounds findings.
    Warn,
    /// Pass summaries and pruned edges.
    Info,
    /// Per-pass change masks and entry updates.
    Debug,
    /// Every instruction transfer with its environment.
    Trace,
}

impl LogLevel {
    /// Whether a message at `msg_level` passes this threshold.
    pub fn admits(self, msg_level: LogLevel) -> bool {
        self != LogLevel::Off && msg_level <= self
    }
}

const TRUNCATION_MARK: &str = "[log truncated]\n";

/// Bounded, leveled log buffer for one procedure analysis.
///
/// Messages below the configured threshold are dropped; once the byte
/// budget runs out a single truncation mark is appended and everything
/// after it is discarded.
#[derive(Debug, Clone)]
pub struct AnalyzerLog {
    threshold: LogLevel,
    buffer: String,
    remaining: usize,
    truncated: bool,
}

impl AnalyzerLog {
    /// A log with the default byte budget.
    pub fn new(threshold: LogLevel) -> Self {
        Self::with_max_size(threshold, crate::verifier::limits::DEFAULT_MAX_LOG_SIZE)
    }

    /// A log that stops recording after `max_size` bytes.
    pub fn with_max_size(threshold: LogLevel, max_size: usize) -> Self {
        Self {
            threshold,
            buffer: String::new(),
            remaining: max_size,
            truncated: false,
        }
    }

    /// Whether a message at `level` would be recorded.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.threshold.admits(level) && !self.truncated
    }

    /// Record one message line at `level`.
    pub fn write(&mut self, level: LogLevel, msg: &str) {
        if !self.enabled(level) {
            return;
        }

        let needed = msg.len() + 1;
        if needed > self.remaining {
            self.truncated = true;
            self.buffer.push_str(TRUNCATION_MARK);
            return;
        }
        self.remaining -= needed;
        self.buffer.push_str(msg);
        self.buffer.push('\n');
    }

    /// Everything recorded so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Whether the byte budget was exhausted.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes recorded so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

/// Format an interval for logging
pub fn fmt_interval(interval: Interval) -> String {
    let mut s = String::new();

    if interval.is_const() {
        write!(s, "{}", interval.lo).unwrap();
        return s;
    }

    s.push('[');
    if interval.lo == i32::MIN {
        s.push_str("-inf");
    } else {
        write!(s, "{}", interval.lo).unwrap();
    }
    s.push_str(", ");
    if interval.hi == i32::MAX {
        s.push_str("+inf");
    } else {
        write!(s, "{}", interval.hi).unwrap();
    }
    s.push(']');
    s
}

/// Format an environment summary for logging
pub fn fmt_env(env: &Env) -> String {
    let mut s = String::new();

    let mut first = true;
    for (v, interval) in env.iter() {
        if !first {
            s.push(' ');
        }
        write!(s, "{}={}", v, fmt_interval(*interval)).unwrap();
        first = false;
    }

    s
}

/// Log an instruction transfer at trace level
pub fn log_transfer(log: &mut AnalyzerLog, prog: &Procedure, value: ValueId, env: &Env) {
    if !log.enabled(LogLevel::Trace) {
        return;
    }

    let insn_str = crate::core::disasm::fmt_inst(prog, value);
    let env_str = fmt_env(env);

    let msg = crate::stdlib::format!("{} ; {}", insn_str, env_str);
    log.write(LogLevel::Trace, &msg);
}

/// Log a pruned (infeasible) branch edge
pub fn log_pruned_edge(log: &mut AnalyzerLog, from: BlockId, to: BlockId) {
    if !log.enabled(LogLevel::Info) {
        return;
    }

    let msg = crate::stdlib::format!("edge {} -> {} pruned (infeasible)", from, to);
    log.write(LogLevel::Info, &msg);
}
