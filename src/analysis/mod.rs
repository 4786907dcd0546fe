// SPDX-License-Identifier: GPL-2.0

//! Program analysis for the bounds verifier.
//!
//! This module contains the control-flow successor index, the abstract
//! transfer functions, and the fixpoint engine that drives them to
//! convergence.

pub mod cfg;
pub mod fixpoint;
pub mod transfer;

pub use cfg::*;
pub use fixpoint::*;
pub use transfer::*;
