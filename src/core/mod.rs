// SPDX-License-Identifier: GPL-2.0

//! Core types and the procedure model for the bounds verifier.
//!
//! This module contains the IR value and instruction types, the procedure
//! model and its builder, error definitions, logging, and disassembly used
//! throughout the analyzer.

pub mod disasm;
pub mod error;
pub mod ir;
pub mod log;
pub mod types;

pub use disasm::*;
pub use error::*;
pub use ir::*;
pub use log::*;
pub use types::*;
