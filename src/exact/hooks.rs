//! Extension points of the exact search.
//!
//! Problem variants that layer a secondary objective over the tour cost plug
//! in here instead of re-implementing the search. Every hook receives a
//! read-only [`SearchView`] of the template state at the moment it fires.

use crate::matrix::CostMatrix;

/// Read-only snapshot of the search handed to hooks.
#[derive(Debug, Clone, Copy)]
pub struct SearchView<'a> {
    pub matrix: &'a CostMatrix,
    pub best_tour: &'a [usize],
    pub best_cost: f64,
    /// Vertices visited on the current branch, in visiting order
    pub closed: &'a [usize],
    /// Vertices not yet visited on the current branch, ascending
    pub open: &'a [usize],
}

type Hook<'h> = Box<dyn FnMut(&SearchView<'_>) + 'h>;

/// Caller-supplied callbacks invoked by [`ExactSolver`](super::ExactSolver).
///
/// - `on_strict_improvement` fires when a complete tour beats the previous best.
/// - `on_equal_cost` fires when a complete tour ties the previous best.
/// - `solve_sub_problem` fires once, after the searches from all start vertices.
#[derive(Default)]
pub struct SearchHooks<'h> {
    solve_sub_problem: Option<Hook<'h>>,
    on_strict_improvement: Option<Hook<'h>>,
    on_equal_cost: Option<Hook<'h>>,
}

impl<'h> SearchHooks<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solve_sub_problem(mut self, hook: impl FnMut(&SearchView<'_>) + 'h) -> Self {
        self.solve_sub_problem = Some(Box::new(hook));
        self
    }

    pub fn on_strict_improvement(mut self, hook: impl FnMut(&SearchView<'_>) + 'h) -> Self {
        self.on_strict_improvement = Some(Box::new(hook));
        self
    }

    pub fn on_equal_cost(mut self, hook: impl FnMut(&SearchView<'_>) + 'h) -> Self {
        self.on_equal_cost = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_sub_problem(&mut self, view: &SearchView<'_>) {
        if let Some(hook) = self.solve_sub_problem.as_mut() {
            hook(view);
        }
    }

    pub(crate) fn fire_strict_improvement(&mut self, view: &SearchView<'_>) {
        if let Some(hook) = self.on_strict_improvement.as_mut() {
            hook(view);
        }
    }

    pub(crate) fn fire_equal_cost(&mut self, view: &SearchView<'_>) {
        if let Some(hook) = self.on_equal_cost.as_mut() {
            hook(view);
        }
    }
}

impl std::fmt::Debug for SearchHooks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHooks")
            .field("solve_sub_problem", &self.solve_sub_problem.is_some())
            .field("on_strict_improvement", &self.on_strict_improvement.is_some())
            .field("on_equal_cost", &self.on_equal_cost.is_some())
            .finish()
    }
}
