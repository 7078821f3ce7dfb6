/// Exact search configuration
#[derive(Debug, Clone)]
pub struct ExactConfig {
    /// Name of the problem being solved, used in log output
    pub problem_name: String,
    /// Searches start from every vertex in `0..=max_start_vertex`
    pub max_start_vertex: usize,
}

impl ExactConfig {
    pub fn new(problem_name: &str) -> Self {
        ExactConfig {
            problem_name: problem_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_max_start_vertex(mut self, max_start_vertex: usize) -> Self {
        self.max_start_vertex = max_start_vertex;
        self
    }
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig {
            problem_name: "tsp".to_string(),
            max_start_vertex: 0,
        }
    }
}
