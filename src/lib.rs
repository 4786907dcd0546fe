//! # Bounds Verifier
//!
//! Interval-based value range analysis and static array bounds checking for
//! compiled procedures in a three-address intermediate representation.
//!
//! The analyzer consumes one procedure at a time as a control-flow graph of
//! basic blocks, runs a monotone dataflow computation over per-edge interval
//! environments, and then reports every array indexing operation whose index
//! interval provably falls outside `[0, len)`.
//!
//! ## Features
//!
//! - **Interval Tracking**: per-variable `[lo, hi]` intervals with 32-bit
//!   saturation on overflow
//! - **Branch Refinement**: comparison outcomes narrow intervals along each
//!   outgoing edge of a conditional branch
//! - **Edge Pruning**: infeasible branch edges carry no environment and the
//!   blocks they would reach are never analyzed
//! - **Widening**: growing bounds jump to infinity at the recording site, so
//!   loops always converge
//! - **Bounds Checking**: a post-fixpoint pass flags indexing operations that
//!   cannot stay inside the array
//!
//! ## Quick Start
//!
//! ```rust
//! use bounds_verifier::core::ir::ProcBuilder;
//! use bounds_verifier::verifier::analyzer::analyze_procedure;
//!
//! // int a[10]; ... = a[10];
//! let mut b = ProcBuilder::new("oob");
//! let arr = b.alloc_array(10);
//! b.index(arr, 10);
//! b.ret();
//! let prog = b.finish().unwrap();
//!
//! let report = analyze_procedure(&prog).unwrap();
//! assert_eq!(report.diagnostics.len(), 1);
//! ```
//!
//! ## Module Structure
//!
//! - [`core`]: IR model, procedure builder, errors, logging, disassembly
//! - [`bounds`]: interval primitive and comparison-driven range refinement
//! - [`state`]: abstract environments (variable -> interval)
//! - [`analysis`]: flow graph, abstract transfer, fixpoint engine
//! - [`verifier`]: driver, bounds verifier, diagnostics, statistics
//!
//! ## no_std Support
//!
//! The crate supports `no_std` for embedding into a host compiler that does
//! not link the standard library. Disable default features:
//!
//! ```toml
//! [dependencies]
//! bounds-verifier = { version = "0.1", default-features = false }
//! ```

// Conditional no_std support
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

// When no_std, use alloc crate for collections
#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export alloc types for internal use
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
pub(crate) mod stdlib {
    pub use alloc::boxed::Box;
    pub use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
    pub use alloc::format;
    pub use alloc::string::{String, ToString};
    pub use alloc::vec;
    pub use alloc::vec::Vec;
}

#[cfg(feature = "std")]
#[allow(unused_imports)]
pub(crate) mod stdlib {
    pub use std::boxed::Box;
    pub use std::collections::{BTreeMap, BTreeSet, VecDeque};
    pub use std::format;
    pub use std::string::{String, ToString};
    pub use std::vec;
    pub use std::vec::Vec;
}

/// IR model, errors, logging, and disassembly
pub mod core;

/// Interval primitive and range refinement
pub mod bounds;

/// Abstract environments
pub mod state;

/// Flow graph, transfer functions, and the fixpoint engine
pub mod analysis;

/// Analysis driver, bounds verifier, and diagnostics
pub mod verifier;

// ============================================================================
// Prelude - commonly used re-exports
// ============================================================================

/// Commonly used types and traits
pub mod prelude {
    pub use crate::bounds::interval::Interval;
    pub use crate::core::error::{AnalyzerError, Result};
    pub use crate::core::ir::{ProcBuilder, Procedure};
    pub use crate::core::types::{AluOp, BlockId, CmpPred, Operand, ValueId};
    pub use crate::verifier::analyzer::{analyze_procedure, AnalysisReport, Analyzer};
    pub use crate::verifier::diagnostics::Diagnostic;
}

// Re-export error types at crate root for convenience
pub use crate::core::error::{AnalyzerError, Result};
