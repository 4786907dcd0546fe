// SPDX-License-Identifier: GPL-2.0

//! State representation for the bounds verifier.
//!
//! This module contains the abstract environment: the per-program-point
//! mapping from variable identity to interval facts.

pub mod env;

pub use env::*;
