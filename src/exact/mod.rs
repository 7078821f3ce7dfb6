//! Exact solvers module.
//!
//! The backtracking template is seeded by the nearest neighbour heuristic and
//! enumerates every optimal tour, exposing hooks for problem variants.

pub mod backtracking;
pub mod config;
pub mod hooks;

pub use backtracking::*;
pub use config::*;
pub use hooks::*;
