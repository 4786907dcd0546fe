//! Out-of-bounds diagnostics.
//!
//! Diagnostics are advisory: the analysis still succeeds when some were
//! emitted. Rendering follows the host compiler convention when a source
//! location is available and falls back to the IR text otherwise.

use crate::core::types::SourceLoc;
use crate::stdlib::String;
use core::fmt;

/// One detected out-of-bounds array access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source location, when the procedure carries debug info.
    pub loc: Option<SourceLoc>,
    /// Textual form of the offending indexing instruction.
    pub inst_text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{}: warning: Array out of bounds access.", loc),
            None => write!(
                f,
                "WARNING: Array out of bounds access at {}\n\
                 Recompile with debug info (-g) to see the source location.",
                self.inst_text
            ),
        }
    }
}
