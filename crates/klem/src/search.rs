//! Depth-first exploration of the search tree spanned by a [`Brancher`], using
//! the trail of the [`Solver`] to backtrack.

use std::{
	cmp::max,
	fmt::{self, Debug},
	time::{Duration, Instant},
};

use tracing::{debug, trace};

use crate::{
	branchers::Brancher,
	solver::{
		engine::{int_var::IntCondition, trail::TrailMark},
		view::IntView,
	},
	Solver, SolverError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// A search decision: a condition that is enforced on an integer view.
pub struct Decision {
	/// The view that is changed by the decision.
	pub var: IntView,
	/// The condition enforced on the view.
	pub condition: IntCondition,
}

/// Depth-first search driver that explores the alternatives returned by a
/// [`Brancher`], restoring the solver state when it backtracks.
pub struct DepthFirstSearch<B: Brancher> {
	/// The brancher that splits search nodes.
	brancher: B,
	/// Limits after which the search is stopped.
	limit: SearchLimit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
/// Limits that stop a search before the search tree is fully explored.
///
/// Limits are checked between decisions, never during propagation.
pub struct SearchLimit {
	/// Maximum number of nodes visited.
	max_nodes: Option<u64>,
	/// Maximum number of failures encountered.
	max_failures: Option<u64>,
	/// Maximum number of solutions found.
	max_solutions: Option<u64>,
	/// Maximum number of decisions on a branch, nodes at this depth are not
	/// split any further.
	max_depth: Option<usize>,
	/// Maximum discrepancy of a branch, where taking the `i`-th alternative of
	/// a node adds `i` to the discrepancy.
	max_discrepancy: Option<usize>,
	/// Maximum wall-clock time spent searching.
	time_limit: Option<Duration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
/// Statistics collected during a search.
pub struct SearchStatistics {
	/// Number of nodes visited (including the root and failed nodes).
	nodes: u64,
	/// Number of nodes in which an inconsistency was found.
	failures: u64,
	/// Number of solutions found.
	solutions: u64,
	/// Largest number of decisions on a branch.
	peak_depth: usize,
	/// Whether the search tree was fully explored.
	completed: bool,
}

/// An alternative that has not yet been explored.
#[derive(Clone, Copy, Debug)]
struct Alternative {
	/// State of the parent node.
	mark: TrailMark,
	/// The decision made in the parent node.
	decision: Decision,
	/// Number of decisions on the branch after the decision is made.
	depth: usize,
	/// Discrepancy of the branch after the decision is made.
	discrepancy: usize,
}

impl<B: Brancher> DepthFirstSearch<B> {
	/// Create a new search that uses `brancher` to split search nodes.
	pub fn new(brancher: B) -> Self {
		Self {
			brancher,
			limit: SearchLimit::default(),
		}
	}

	/// Explore the search tree of `slv`, calling `on_solution` for every
	/// solution found.
	///
	/// The solver is restored to its initial state when the search finishes.
	pub fn solve<F: FnMut(&Solver)>(
		&mut self,
		slv: &mut Solver,
		on_solution: F,
	) -> Result<SearchStatistics, SolverError> {
		self.solve_subject_to(slv, &[], on_solution)
	}

	/// Explore the search tree of `slv` after enforcing the given decisions,
	/// calling `on_solution` for every solution found.
	///
	/// The decisions are only enforced during this search: the solver is
	/// restored to its initial state when the search finishes.
	pub fn solve_subject_to<F: FnMut(&Solver)>(
		&mut self,
		slv: &mut Solver,
		decisions: &[Decision],
		mut on_solution: F,
	) -> Result<SearchStatistics, SolverError> {
		let root = slv.save_state();
		let mut stats = SearchStatistics::default();
		let result = self.explore(slv, decisions, &mut on_solution, &mut stats);
		slv.restore_state(root);
		debug!(
			nodes = stats.nodes,
			failures = stats.failures,
			solutions = stats.solutions,
			completed = stats.completed,
			"search finished"
		);
		result.map(|()| stats)
	}

	/// Internal method that explores the search tree, collecting statistics in
	/// `stats`.
	fn explore(
		&mut self,
		slv: &mut Solver,
		decisions: &[Decision],
		on_solution: &mut dyn FnMut(&Solver),
		stats: &mut SearchStatistics,
	) -> Result<(), SolverError> {
		let start = Instant::now();
		stats.nodes += 1;
		let root = decisions
			.iter()
			.try_for_each(|&d| slv.apply(d))
			.and_then(|()| slv.fixpoint());
		match root {
			Ok(()) => {}
			Err(SolverError::Inconsistent(_)) => {
				stats.failures += 1;
				stats.completed = true;
				return Ok(());
			}
			Err(SolverError::Unsatisfiable) => {
				stats.completed = true;
				return Ok(());
			}
			Err(err) => return Err(err),
		}

		let mut stack: Vec<Alternative> = Vec::new();
		let mut depth = 0;
		let mut discrepancy = 0;
		let mut pruned = false;
		loop {
			let alternatives = self.brancher.branch(slv);
			if alternatives.is_empty() {
				stats.solutions += 1;
				debug!(solutions = stats.solutions, depth, "solution found");
				on_solution(slv);
			} else if self.limit.max_depth.is_some_and(|d| depth >= d) {
				pruned = true;
			} else {
				let mark = slv.save_state();
				let allowed = match self.limit.max_discrepancy {
					Some(d) => (d.saturating_sub(discrepancy) + 1).min(alternatives.len()),
					None => alternatives.len(),
				};
				pruned |= allowed < alternatives.len();
				stack.extend(
					alternatives
						.into_iter()
						.take(allowed)
						.enumerate()
						.rev()
						.map(|(i, decision)| Alternative {
							mark,
							decision,
							depth: depth + 1,
							discrepancy: discrepancy + i,
						}),
				);
			}

			// Find the next consistent node
			loop {
				if self.limit.reached(stats, start) {
					debug!("search limit reached");
					return Ok(());
				}
				let Some(alt) = stack.pop() else {
					stats.completed = !pruned;
					return Ok(());
				};
				slv.restore_state(alt.mark);
				depth = alt.depth;
				discrepancy = alt.discrepancy;
				stats.peak_depth = max(stats.peak_depth, depth);
				stats.nodes += 1;
				trace!(decision = ?alt.decision, depth, "decide");
				match slv.decide(alt.decision) {
					Ok(()) => break,
					Err(SolverError::Inconsistent(_)) => stats.failures += 1,
					Err(err) => return Err(err),
				}
			}
		}
	}

	/// Change the limits after which the search is stopped.
	pub fn with_limit(mut self, limit: SearchLimit) -> Self {
		self.limit = limit;
		self
	}
}

impl<B: Brancher> Debug for DepthFirstSearch<B> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DepthFirstSearch")
			.field("limit", &self.limit)
			.finish_non_exhaustive()
	}
}

impl SearchLimit {
	/// Internal method that checks whether any of the limits has been reached.
	fn reached(&self, stats: &SearchStatistics, start: Instant) -> bool {
		self.max_nodes.is_some_and(|n| stats.nodes >= n)
			|| self.max_failures.is_some_and(|n| stats.failures >= n)
			|| self.max_solutions.is_some_and(|n| stats.solutions >= n)
			|| self.time_limit.is_some_and(|t| start.elapsed() >= t)
	}

	/// Stop the search after visiting the given number of nodes.
	pub fn with_max_nodes(mut self, n: u64) -> Self {
		self.max_nodes = Some(n);
		self
	}

	/// Stop the search after encountering the given number of failures.
	pub fn with_max_failures(mut self, n: u64) -> Self {
		self.max_failures = Some(n);
		self
	}

	/// Stop the search after finding the given number of solutions.
	pub fn with_max_solutions(mut self, n: u64) -> Self {
		self.max_solutions = Some(n);
		self
	}

	/// Do not split nodes that are reached after the given number of decisions.
	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = Some(depth);
		self
	}

	/// Limit the search to branches with at most the given discrepancy, i.e.,
	/// limited discrepancy search.
	///
	/// Choosing the first alternative of a node does not add to the discrepancy
	/// of a branch, choosing the second alternative adds one, and so on.
	pub fn with_max_discrepancy(mut self, discrepancy: usize) -> Self {
		self.max_discrepancy = Some(discrepancy);
		self
	}

	/// Stop the search after the given amount of time.
	pub fn with_time_limit(mut self, limit: Duration) -> Self {
		self.time_limit = Some(limit);
		self
	}
}

impl SearchStatistics {
	/// Whether the search tree was fully explored.
	pub fn completed(&self) -> bool {
		self.completed
	}
	/// Number of nodes in which an inconsistency was found.
	pub fn failures(&self) -> u64 {
		self.failures
	}
	/// Number of nodes visited.
	pub fn nodes(&self) -> u64 {
		self.nodes
	}
	/// Largest number of decisions on a branch.
	pub fn peak_depth(&self) -> usize {
		self.peak_depth
	}
	/// Number of solutions found.
	pub fn solutions(&self) -> u64 {
		self.solutions
	}
}
