use crate::matrix::{CostMatrix, DEPOT, INF};
use crate::solution::Solution;
use log::info;

pub trait ConstructionHeuristic {
    fn construct(&self, matrix: &CostMatrix) -> Solution;
    fn name(&self) -> &str;
}

/// Nearest Neighbor Heuristic
///
/// Builds a tour from the depot by repeatedly moving to the cheapest
/// unvisited vertex. Among equally cheap candidates the one appearing last in
/// ascending vertex order wins. If every remaining edge is `+inf` the last
/// candidate is taken anyway and the resulting weight is `+inf`, which callers
/// read as "no greedy tour exists".
pub struct NearestNeighborHeuristic;

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic
    }

    /// Index into `open` of the cheapest successor of `current`, with its cost.
    fn find_nearest(&self, matrix: &CostMatrix, current: usize, open: &[usize]) -> (usize, f64) {
        let mut nearest = 0;
        let mut nearest_cost = INF;

        for (index, &vertex) in open.iter().enumerate() {
            let cost = matrix.cost(current, vertex);
            if cost <= nearest_cost {
                nearest = index;
                nearest_cost = cost;
            }
        }

        (nearest, nearest_cost)
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, matrix: &CostMatrix) -> Solution {
        let start = std::time::Instant::now();
        let n = matrix.dimension();
        info!("Running nearest neighbour heuristic on a {}x{} matrix", n, n);

        let mut tour = Vec::with_capacity(n);
        tour.push(DEPOT);
        let mut open: Vec<usize> = (1..n).collect();
        let mut current = DEPOT;
        let mut weight = 0.0;

        while !open.is_empty() {
            let (index, cost) = self.find_nearest(matrix, current, &open);
            current = open.remove(index);
            tour.push(current);
            weight += cost;
        }
        weight += matrix.cost(current, DEPOT);

        info!("shortest path: {:?}", tour);
        info!("weight: {}", weight);

        Solution {
            tour,
            cost: weight,
            algorithm: self.name().to_string(),
            computation_time: start.elapsed().as_secs_f64(),
        }
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}
