//! Analysis limits.
//!
//! Widening guarantees that the fixpoint converges on supported input, so
//! these limits guard the analyzer against its own bugs rather than against
//! hostile procedures. Hitting one is an internal error, not a diagnostic.

/// Maximum breadth-first passes before the fixpoint gives up.
///
/// Each variable endpoint can change only a bounded number of times once
/// widening pins growth, so converging procedures stay far below this.
pub const MAX_FIXPOINT_PASSES: usize = 10_000;

/// Default maximum analyzer log buffer size in bytes.
pub const DEFAULT_MAX_LOG_SIZE: usize = 1024 * 1024; // 1 MB
