//! Exact TSP search by bounded depth-first backtracking.
//!
//! The search is seeded with the nearest neighbour tour, whose weight serves
//! as the initial bound. From each start vertex it extends a partial tour in
//! ascending vertex order, skipping `+inf` edges and abandoning a branch as
//! soon as its running cost reaches the best known complete cost. Every
//! complete tour is closed through the depot, also when the search started
//! from another vertex.
//!
//! All complete tours matching the final best cost are kept in discovery
//! order, starting with the greedy seed when it is itself optimal.

use crate::error::{Result, SolverError};
use crate::exact::config::ExactConfig;
use crate::exact::hooks::{SearchHooks, SearchView};
use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use crate::matrix::{CostMatrix, DEPOT, INF};
use crate::solution::Solution;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Per-start backtracking state.
///
/// `closed` and `open` partition the vertices. Both are allocated once with
/// capacity `N`, so pushing and re-inserting never reallocates.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    closed: Vec<usize>,
    open: Vec<usize>,
}

impl SearchState {
    fn new(dimension: usize) -> Self {
        SearchState {
            closed: Vec::with_capacity(dimension),
            open: Vec::with_capacity(dimension),
        }
    }

    /// Reset to a single visited vertex `start`, all others open in ascending order.
    fn reset(&mut self, start: usize, dimension: usize) {
        self.closed.clear();
        self.closed.push(start);
        self.open.clear();
        self.open.extend((0..dimension).filter(|&v| v != start));
    }

    #[inline]
    fn last(&self) -> usize {
        self.closed[self.closed.len() - 1]
    }
}

/// Result of an exact search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactResult {
    /// Last tour installed as best
    pub best_tour: Vec<usize>,
    /// Minimum closed-tour cost, `+inf` when no tour exists
    #[serde(with = "crate::matrix::extended_real")]
    pub best_cost: f64,
    /// Every distinct tour found at `best_cost`, in discovery order
    pub all_best_tours: Vec<Vec<usize>>,
    /// Nearest neighbour seed
    pub greedy: Solution,
    /// Wall-clock duration of the search, excluding the greedy seed
    pub elapsed: Duration,
    /// Number of search frames entered
    pub nodes_explored: u64,
    /// Number of complete tours that beat the previous best
    pub strict_improvements: usize,
    /// Number of complete tours that tied the previous best
    pub equal_cost_hits: usize,
}

impl ExactResult {
    pub fn is_feasible(&self) -> bool {
        self.best_cost.is_finite()
    }

    pub fn to_solution(&self) -> Solution {
        Solution {
            tour: self.best_tour.clone(),
            cost: self.best_cost,
            algorithm: "Backtracking".to_string(),
            computation_time: self.elapsed.as_secs_f64(),
        }
    }
}

/// Exact search template over a shared cost matrix.
pub struct ExactSolver<'a> {
    matrix: &'a CostMatrix,
    best_tour: Vec<usize>,
    best_cost: f64,
    all_best_tours: Vec<Vec<usize>>,
    elapsed: Duration,
    nodes_explored: u64,
    strict_improvements: usize,
    equal_cost_hits: usize,
}

impl<'a> ExactSolver<'a> {
    pub fn new(matrix: &'a CostMatrix) -> Self {
        ExactSolver {
            matrix,
            best_tour: Vec::new(),
            best_cost: INF,
            all_best_tours: Vec::new(),
            elapsed: Duration::ZERO,
            nodes_explored: 0,
            strict_improvements: 0,
            equal_cost_hits: 0,
        }
    }

    /// Search from the depot only, without hooks.
    pub fn solve(&mut self, problem: &str) -> ExactResult {
        self.run(&ExactConfig::new(problem), &mut SearchHooks::new())
    }

    /// Search from every start vertex in `0..=config.max_start_vertex`,
    /// invoking `hooks` at improvement events and once at the end.
    pub fn solve_with(
        &mut self,
        config: &ExactConfig,
        hooks: &mut SearchHooks<'_>,
    ) -> Result<ExactResult> {
        let dimension = self.matrix.dimension();
        if config.max_start_vertex >= dimension {
            return Err(SolverError::StartVertexOutOfRange {
                vertex: config.max_start_vertex,
                dimension,
            });
        }

        Ok(self.run(config, hooks))
    }

    pub fn matrix(&self) -> &CostMatrix {
        self.matrix
    }

    pub fn best_tour(&self) -> &[usize] {
        &self.best_tour
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    pub fn all_best_tours(&self) -> &[Vec<usize>] {
        &self.all_best_tours
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn run(&mut self, config: &ExactConfig, hooks: &mut SearchHooks<'_>) -> ExactResult {
        info!("exact solution {}", config.problem_name);
        let dimension = self.matrix.dimension();

        let greedy = NearestNeighborHeuristic::new().construct(self.matrix);
        self.best_tour = greedy.tour.clone();
        self.best_cost = greedy.cost;
        self.all_best_tours = vec![greedy.tour.clone()];
        self.nodes_explored = 0;
        self.strict_improvements = 0;
        self.equal_cost_hits = 0;

        let start = Instant::now();
        let mut state = SearchState::new(dimension);
        for vertex in 0..=config.max_start_vertex {
            debug!("searching from start vertex {} (bound {})", vertex, self.best_cost);
            state.reset(vertex, dimension);
            self.explore(&mut state, 0.0, hooks);
        }
        hooks.fire_sub_problem(&self.view(&state));
        self.elapsed = start.elapsed();

        info!("time: {}", self.elapsed.as_secs_f64());

        ExactResult {
            best_tour: self.best_tour.clone(),
            best_cost: self.best_cost,
            all_best_tours: self.all_best_tours.clone(),
            greedy,
            elapsed: self.elapsed,
            nodes_explored: self.nodes_explored,
            strict_improvements: self.strict_improvements,
            equal_cost_hits: self.equal_cost_hits,
        }
    }

    fn explore(&mut self, state: &mut SearchState, running_cost: f64, hooks: &mut SearchHooks<'_>) {
        self.nodes_explored += 1;

        if state.open.is_empty() {
            self.close_tour(state, running_cost, hooks);
            return;
        }

        let mut i = 0;
        while i < state.open.len() && running_cost < self.best_cost {
            let vertex = state.open[i];
            let cost = self.matrix.cost(state.last(), vertex);
            if cost == INF {
                i += 1;
                continue;
            }

            state.open.remove(i);
            state.closed.push(vertex);
            self.explore(state, running_cost + cost, hooks);
            state.closed.pop();
            state.open.insert(i, vertex);
            i += 1;
        }
    }

    /// Leaf of the search: close the tour through the depot and compare with the best.
    fn close_tour(&mut self, state: &SearchState, running_cost: f64, hooks: &mut SearchHooks<'_>) {
        let total = running_cost + self.matrix.cost(state.last(), DEPOT);
        if !total.is_finite() || total > self.best_cost {
            return;
        }

        let previous = self.best_cost;
        self.best_cost = total;
        self.best_tour.clone_from(&state.closed);

        if total < previous {
            debug!("improved tour {:?} with cost {}", state.closed, total);
            self.strict_improvements += 1;
            self.all_best_tours.clear();
            self.all_best_tours.push(state.closed.clone());
            hooks.fire_strict_improvement(&self.view(state));
        } else {
            self.equal_cost_hits += 1;
            if !self.all_best_tours.contains(&state.closed) {
                self.all_best_tours.push(state.closed.clone());
            }
            hooks.fire_equal_cost(&self.view(state));
        }
    }

    fn view<'s>(&'s self, state: &'s SearchState) -> SearchView<'s> {
        SearchView {
            matrix: self.matrix,
            best_tour: &self.best_tour,
            best_cost: self.best_cost,
            closed: &state.closed,
            open: &state.open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init_logger, logged};
    use std::cell::{Cell, RefCell};

    fn matrix(rows: Vec<Vec<f64>>) -> CostMatrix {
        CostMatrix::new(rows).unwrap()
    }

    fn triangle() -> CostMatrix {
        matrix(vec![
            vec![INF, 1.0, 2.0],
            vec![1.0, INF, 3.0],
            vec![2.0, 3.0, INF],
        ])
    }

    fn asymmetric() -> CostMatrix {
        matrix(vec![
            vec![INF, 10.0, 15.0, 20.0],
            vec![5.0, INF, 9.0, 10.0],
            vec![6.0, 13.0, INF, 12.0],
            vec![8.0, 8.0, 9.0, INF],
        ])
    }

    fn single_tour() -> CostMatrix {
        matrix(vec![
            vec![INF, 1.0, INF],
            vec![INF, INF, 1.0],
            vec![1.0, INF, INF],
        ])
    }

    fn disconnected() -> CostMatrix {
        matrix(vec![
            vec![INF, INF, INF],
            vec![INF, INF, 1.0],
            vec![1.0, INF, INF],
        ])
    }

    fn uniform() -> CostMatrix {
        matrix(vec![vec![1.0; 4]; 4])
    }

    /// A cheap chain 0 -> 1 -> 2 -> 3 -> 4 that ends with an expensive return.
    fn greedy_trap() -> CostMatrix {
        let mut rows = vec![vec![10.0; 5]; 5];
        for i in 0..4 {
            rows[i][i + 1] = 1.0;
        }
        rows[4][0] = 100.0;
        matrix(rows)
    }

    fn is_permutation(tour: &[usize], dimension: usize) -> bool {
        let mut sorted = tour.to_vec();
        sorted.sort_unstable();
        sorted == (0..dimension).collect::<Vec<_>>()
    }

    fn counting_hooks<'h>(
        strict: &'h Cell<usize>,
        equal: &'h Cell<usize>,
        sub: &'h Cell<usize>,
    ) -> SearchHooks<'h> {
        SearchHooks::new()
            .on_strict_improvement(move |_| strict.set(strict.get() + 1))
            .on_equal_cost(move |_| equal.set(equal.get() + 1))
            .solve_sub_problem(move |_| sub.set(sub.get() + 1))
    }

    #[test]
    fn test_symmetric_triangle() {
        init_logger();
        let matrix = triangle();
        let mut solver = ExactSolver::new(&matrix);
        let result = solver.solve("triangle");

        assert_eq!(result.greedy.tour, vec![0, 1, 2]);
        assert!((result.greedy.cost - 6.0).abs() < 1e-10);
        assert!((result.best_cost - 6.0).abs() < 1e-10);
        // both orientations tie; the last one found is installed
        assert_eq!(result.all_best_tours, vec![vec![0, 1, 2], vec![0, 2, 1]]);
        assert_eq!(result.best_tour, vec![0, 2, 1]);
        assert_eq!(result.strict_improvements, 0);
        assert_eq!(result.equal_cost_hits, 2);

        assert!(logged(|line| line == "exact solution triangle"));
        assert!(logged(|line| line.starts_with("time: ")));

        assert_eq!(solver.best_tour(), result.best_tour.as_slice());
        assert_eq!(solver.best_cost(), result.best_cost);
        assert_eq!(solver.all_best_tours(), result.all_best_tours.as_slice());
    }

    #[test]
    fn test_multi_start_closes_through_depot() {
        init_logger();
        let matrix = triangle();
        let strict = Cell::new(0);
        let equal = Cell::new(0);
        let sub = Cell::new(0);
        let mut hooks = counting_hooks(&strict, &equal, &sub);

        let config = ExactConfig::new("triangle").with_max_start_vertex(2);
        let result = ExactSolver::new(&matrix).solve_with(&config, &mut hooks).unwrap();

        // 2 -> 0 -> 1 and back to the depot costs 2 + 1 + 1
        assert!((result.best_cost - 4.0).abs() < 1e-10);
        assert_eq!(result.best_tour, vec![2, 0, 1]);
        assert_eq!(result.all_best_tours, vec![vec![2, 0, 1]]);
        assert_eq!(strict.get(), 2);
        assert_eq!(equal.get(), 2);
        assert_eq!(sub.get(), 1);
    }

    #[test]
    fn test_asymmetric_optimum() {
        init_logger();
        let matrix = asymmetric();
        let strict = Cell::new(0);
        let equal = Cell::new(0);
        let sub = Cell::new(0);
        let mut hooks = counting_hooks(&strict, &equal, &sub);

        let result = ExactSolver::new(&matrix)
            .solve_with(&ExactConfig::new("asymmetric"), &mut hooks)
            .unwrap();

        assert!((result.greedy.cost - 39.0).abs() < 1e-10);
        assert!((result.best_cost - 35.0).abs() < 1e-10);
        assert_eq!(result.best_tour, vec![0, 1, 3, 2]);
        assert_eq!(result.all_best_tours, vec![vec![0, 1, 3, 2]]);
        // the greedy tour is met again before the optimum
        assert_eq!(strict.get(), 1);
        assert_eq!(equal.get(), 1);
        assert_eq!(sub.get(), 1);
    }

    #[test]
    fn test_single_feasible_tour() {
        let matrix = single_tour();
        let result = ExactSolver::new(&matrix).solve("single");

        assert_eq!(result.greedy.tour, vec![0, 1, 2]);
        assert!((result.best_cost - 3.0).abs() < 1e-10);
        assert_eq!(result.all_best_tours.len(), 1);
        assert_eq!(result.best_tour, vec![0, 1, 2]);
        assert_eq!(result.nodes_explored, 3);
    }

    #[test]
    fn test_disconnected_depot() {
        let matrix = disconnected();
        let strict = Cell::new(0);
        let equal = Cell::new(0);
        let sub = Cell::new(0);
        let mut hooks = counting_hooks(&strict, &equal, &sub);

        let result = ExactSolver::new(&matrix)
            .solve_with(&ExactConfig::new("disconnected"), &mut hooks)
            .unwrap();

        assert_eq!(result.best_cost, INF);
        assert!(!result.is_feasible());
        assert_eq!(result.nodes_explored, 1);
        assert_eq!(strict.get(), 0);
        assert_eq!(equal.get(), 0);
        assert_eq!(sub.get(), 1);

        let json = serde_json::to_string(&result).unwrap();
        let restored: ExactResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.best_cost, INF);
        assert_eq!(restored.greedy.cost, INF);
        assert_eq!(restored.best_tour, result.best_tour);
        assert_eq!(restored.all_best_tours, result.all_best_tours);
    }

    #[test]
    fn test_all_ties_recorded() {
        let matrix = uniform();
        let ties = RefCell::new(Vec::new());
        let mut hooks =
            SearchHooks::new().on_equal_cost(|view| ties.borrow_mut().push(view.closed.to_vec()));

        let result = ExactSolver::new(&matrix)
            .solve_with(&ExactConfig::new("uniform"), &mut hooks)
            .unwrap();

        assert!((result.best_cost - 4.0).abs() < 1e-10);
        assert_eq!(result.best_tour, vec![0, 3, 2, 1]);
        assert_eq!(
            result.all_best_tours,
            vec![
                vec![0, 3, 2, 1],
                vec![0, 1, 2, 3],
                vec![0, 1, 3, 2],
                vec![0, 2, 1, 3],
                vec![0, 2, 3, 1],
                vec![0, 3, 1, 2],
            ]
        );
        assert_eq!(ties.borrow().len(), 6);
        assert_eq!(ties.borrow()[5], vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_greedy_suboptimal() {
        init_logger();
        let matrix = greedy_trap();
        let mut solver = ExactSolver::new(&matrix);
        let result = solver.solve("trap");

        assert_eq!(result.greedy.tour, vec![0, 1, 2, 3, 4]);
        assert!((result.greedy.cost - 104.0).abs() < 1e-10);
        assert!((result.best_cost - 32.0).abs() < 1e-10);
        assert!(result.best_cost < result.greedy.cost);
        assert!(result.elapsed >= Duration::ZERO);
        assert_eq!(solver.elapsed(), result.elapsed);

        let solution = result.to_solution();
        assert_eq!(solution.algorithm, "Backtracking");
        assert!(solution.is_complete(5));
    }

    #[test]
    fn test_start_vertex_out_of_range() {
        let matrix = triangle();
        let config = ExactConfig::new("triangle").with_max_start_vertex(3);
        let err = ExactSolver::new(&matrix)
            .solve_with(&config, &mut SearchHooks::new())
            .unwrap_err();

        assert_eq!(err, SolverError::StartVertexOutOfRange { vertex: 3, dimension: 3 });
    }

    #[test]
    fn test_result_properties() {
        let fixtures = vec![triangle(), asymmetric(), single_tour(), uniform(), greedy_trap()];

        for matrix in &fixtures {
            let n = matrix.dimension();
            let result = ExactSolver::new(matrix).solve("fixture");

            assert!(result.greedy.cost >= result.best_cost);
            assert!(is_permutation(&result.best_tour, n));
            assert_eq!(result.best_tour[0], DEPOT);
            for tour in &result.all_best_tours {
                assert!(is_permutation(tour, n));
                assert!((matrix.tour_cost(tour) - result.best_cost).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_doubling_costs() {
        for matrix in [asymmetric(), greedy_trap(), single_tour()] {
            let doubled = matrix.scaled(2.0).unwrap();
            let base = ExactSolver::new(&matrix).solve("base");
            let scaled = ExactSolver::new(&doubled).solve("doubled");

            assert!((scaled.best_cost - 2.0 * base.best_cost).abs() < 1e-9);
            assert_eq!(scaled.best_tour, base.best_tour);
            assert_eq!(scaled.all_best_tours, base.all_best_tours);
        }
    }

    #[test]
    fn test_deterministic() {
        let matrix = greedy_trap();
        let mut solver = ExactSolver::new(&matrix);
        let first = solver.solve("trap");
        let second = solver.solve("trap");

        assert_eq!(first.best_tour, second.best_tour);
        assert_eq!(first.best_cost, second.best_cost);
        assert_eq!(first.all_best_tours, second.all_best_tours);
        assert_eq!(first.nodes_explored, second.nodes_explored);
    }

    #[test]
    fn test_symmetric_reversal() {
        for matrix in [triangle(), uniform()] {
            assert!(matrix.is_symmetric());
            let result = ExactSolver::new(&matrix).solve("symmetric");

            for tour in &result.all_best_tours {
                let mut reversed = vec![tour[0]];
                reversed.extend(tour[1..].iter().rev());
                assert!(result.all_best_tours.contains(&reversed));
            }
        }
    }

    #[test]
    fn test_hooks_observe_leaf_state() {
        let matrix = asymmetric();
        let mut hooks = SearchHooks::new()
            .on_strict_improvement(|view| {
                assert!(view.open.is_empty());
                assert_eq!(view.closed, view.best_tour);
                assert!((view.matrix.tour_cost(view.closed) - view.best_cost).abs() < 1e-9);
            })
            .solve_sub_problem(|view| {
                assert_eq!(view.closed, &[0]);
                assert_eq!(view.open, &[1, 2, 3]);
                assert_eq!(view.best_tour, &[0, 1, 3, 2]);
            });

        ExactSolver::new(&matrix)
            .solve_with(&ExactConfig::new("asymmetric"), &mut hooks)
            .unwrap();
    }

    #[test]
    fn test_secondary_objective_through_hooks() {
        // every tour ties on the primary matrix; a dependent matrix breaks the tie
        let primary = uniform();
        let secondary = asymmetric();
        let candidates = RefCell::new(Vec::new());
        let chosen = RefCell::new(None);

        let mut hooks = SearchHooks::new()
            .on_strict_improvement(|view| {
                let mut candidates = candidates.borrow_mut();
                candidates.clear();
                candidates.push(view.closed.to_vec());
            })
            .on_equal_cost(|view| candidates.borrow_mut().push(view.closed.to_vec()))
            .solve_sub_problem(|_| {
                let best = candidates
                    .borrow()
                    .iter()
                    .min_by(|a, b| secondary.tour_cost(a).total_cmp(&secondary.tour_cost(b)))
                    .cloned();
                *chosen.borrow_mut() = best;
            });

        ExactSolver::new(&primary)
            .solve_with(&ExactConfig::new("dependent"), &mut hooks)
            .unwrap();

        assert_eq!(candidates.borrow().len(), 6);
        assert_eq!(*chosen.borrow(), Some(vec![0, 1, 3, 2]));
    }
}
