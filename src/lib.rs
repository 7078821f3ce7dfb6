//! TSP Exact Solver Library
//!
//! Finds minimum-cost Hamiltonian tours through a weighted directed graph given
//! as a dense square cost matrix. Edges that cannot be traversed cost `+inf`.
//!
//! # Features
//!
//! - Nearest Neighbor construction heuristic giving a fast upper bound
//! - Exact depth-first backtracking search seeded by the heuristic, recording
//!   every optimal tour
//! - Hooks letting problem variants layer a secondary objective over the search
//! - Benchmarking of heuristic against exact results
//!
//! # Example
//!
//! ```
//! use tsp_exact_solver::matrix::{CostMatrix, INF};
//! use tsp_exact_solver::exact::ExactSolver;
//!
//! let matrix = CostMatrix::new(vec![
//!     vec![INF, 10.0, 15.0, 20.0],
//!     vec![5.0, INF, 9.0, 10.0],
//!     vec![6.0, 13.0, INF, 12.0],
//!     vec![8.0, 8.0, 9.0, INF],
//! ]).unwrap();
//!
//! let result = ExactSolver::new(&matrix).solve("example");
//! assert_eq!(result.best_tour, vec![0, 1, 3, 2]);
//! assert_eq!(result.best_cost, 35.0);
//! ```

pub mod error;
pub mod matrix;
pub mod solution;
pub mod heuristics;
pub mod exact;
pub mod benchmark;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, SolverError};
pub use matrix::CostMatrix;
pub use solution::Solution;
