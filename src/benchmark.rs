//! Benchmarking module comparing the greedy seed with the exact search.
//!
//! Provides tools for running both algorithms on named matrices, collecting
//! per-run rows and aggregating them per algorithm.

use crate::error::Result;
use crate::exact::{ExactConfig, ExactResult, ExactSolver, SearchHooks};
use crate::matrix::CostMatrix;
use crate::solution::Solution;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Matrix dimension
    pub dimension: usize,
    /// Solution cost, `+inf` when no tour was found
    #[serde(with = "crate::matrix::extended_real")]
    pub cost: f64,
    /// Whether a finite tour was found
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to the exact optimum in percent
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_instances: usize,
    pub num_feasible: usize,
    /// Average cost over feasible runs
    pub avg_cost: Option<f64>,
    pub best_cost: Option<f64>,
    pub worst_cost: Option<f64>,
    pub avg_time: f64,
    pub total_time: f64,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone, Default)]
pub struct BenchmarkConfig {
    /// Start vertices searched by the exact solver are `0..=max_start_vertex`,
    /// clamped to the dimension of each matrix
    pub max_start_vertex: usize,
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Run the greedy heuristic and the exact search on a matrix and record both.
    pub fn run_instance(&mut self, name: &str, matrix: &CostMatrix) -> Result<ExactResult> {
        log::info!("Running benchmark on instance: {}", name);

        let max_start_vertex = self.config.max_start_vertex.min(matrix.dimension() - 1);
        let config = ExactConfig::new(name).with_max_start_vertex(max_start_vertex);
        let result = ExactSolver::new(matrix).solve_with(&config, &mut SearchHooks::new())?;

        if result.is_feasible() {
            self.best_known.insert(name.to_string(), result.best_cost);
        } else {
            log::warn!("No finite tour exists for instance {}", name);
        }

        self.record_result(name, matrix, &result.greedy);
        self.record_result(name, matrix, &result.to_solution());

        Ok(result)
    }

    fn record_result(&mut self, name: &str, matrix: &CostMatrix, solution: &Solution) {
        let gap_to_best = self
            .best_known
            .get(name)
            .filter(|&&best| best > 0.0 && solution.cost.is_finite())
            .map(|&best| (solution.cost - best) / best * 100.0);

        self.results.push(AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: name.to_string(),
            dimension: matrix.dimension(),
            cost: solution.cost,
            feasible: solution.is_feasible(),
            time: solution.computation_time,
            gap_to_best,
        });
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Get best known values
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }

    /// Aggregate results per algorithm, in order of first appearance
    pub fn statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut algorithms: Vec<&str> = Vec::new();
        for result in &self.results {
            if !algorithms.contains(&result.algorithm.as_str()) {
                algorithms.push(&result.algorithm);
            }
        }

        algorithms
            .into_iter()
            .map(|algorithm| {
                let runs: Vec<&AlgorithmResult> =
                    self.results.iter().filter(|r| r.algorithm == algorithm).collect();
                let costs: Vec<f64> = runs.iter().filter(|r| r.feasible).map(|r| r.cost).collect();
                let gaps: Vec<f64> = runs.iter().filter_map(|r| r.gap_to_best).collect();
                let total_time: f64 = runs.iter().map(|r| r.time).sum();

                AlgorithmStatistics {
                    algorithm: algorithm.to_string(),
                    num_instances: runs.len(),
                    num_feasible: costs.len(),
                    avg_cost: mean(&costs),
                    best_cost: costs.iter().copied().map(OrderedFloat).min().map(|c| c.0),
                    worst_cost: costs.iter().copied().map(OrderedFloat).max().map(|c| c.0),
                    avg_time: total_time / runs.len() as f64,
                    total_time,
                    avg_gap: mean(&gaps),
                }
            })
            .collect()
    }

    /// Serialize results and statistics as a JSON report
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Report<'a> {
            results: &'a [AlgorithmResult],
            statistics: Vec<AlgorithmStatistics>,
        }

        serde_json::to_string_pretty(&Report {
            results: &self.results,
            statistics: self.statistics(),
        })
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new(BenchmarkConfig::default())
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
