//! Heuristics module for the TSP.
//!
//! This module exports the construction heuristic used to seed the exact search.

pub mod construction;

pub use construction::*;
