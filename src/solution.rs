//! Solution representation for the TSP.
//!
//! A solution is a vertex ordering together with its closed-tour weight and
//! some bookkeeping about how it was produced.

use crate::matrix::{CostMatrix, DEPOT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents a tour through every vertex of a cost matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of vertex indices (implicitly returning to the depot)
    pub tour: Vec<usize>,
    /// Closed-tour weight, `+inf` if any edge is not traversable
    #[serde(with = "crate::matrix::extended_real")]
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(matrix: &CostMatrix, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = matrix.tour_cost(&tour);
        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
        }
    }

    /// A solution is feasible when every edge of its tour is traversable
    pub fn is_feasible(&self) -> bool {
        !self.tour.is_empty() && self.cost.is_finite()
    }

    /// Check if all vertices are visited exactly once, starting at the depot
    pub fn is_complete(&self, dimension: usize) -> bool {
        if self.tour.len() != dimension || self.tour.first() != Some(&DEPOT) {
            return false;
        }

        let unique: HashSet<usize> = self.tour.iter().cloned().collect();
        unique.len() == dimension && self.tour.iter().all(|&v| v < dimension)
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Feasible: {}", self.is_feasible())?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}
