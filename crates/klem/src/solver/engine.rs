//! Module containing the main propagation engine of the solver.

pub(crate) mod activation_list;
pub(crate) mod domain;
pub(crate) mod int_var;
pub(crate) mod queue;
pub(crate) mod solving_context;
pub(crate) mod trail;

use delegate::delegate;
use index_vec::IndexVec;
use tracing::{debug, trace};

use crate::{
	actions::{InspectionActions, TrailingActions},
	propagator::{BoxedPropagator, Inconsistency},
	solver::{
		engine::{
			activation_list::{ActivationList, IntPropCond},
			domain::DomainListener,
			int_var::{DomainRepresentation, IntCondition, IntVar, IntVarRef},
			queue::{PriorityLevel, PriorityQueue},
			solving_context::PropagationContext,
			trail::{Trail, TrailMark, TrailedBool, TrailedInt},
		},
		view::{IntView, IntViewInner},
		SolverConfiguration,
	},
	IntVal,
};

#[derive(Debug, Default)]
/// The propagation engine, which stores the propagators and the state of the
/// variables, and runs propagation until a fixpoint is reached.
pub(crate) struct Engine {
	/// Storage of the propagators.
	pub(crate) propagators: IndexVec<PropRef, BoxedPropagator>,
	/// Internal State representation of the propagation engine.
	///
	/// Kept separate from the propagators, so a propagator can be run while it
	/// has mutable access to the state.
	pub(crate) state: State,
}

/// Listener that schedules the propagators registered on a single integer
/// variable when its domain changes.
struct Notifier<'a> {
	/// Propagators registered on the variable.
	activation: &'a ActivationList,
	/// Queue of propagators awaiting action.
	queue: &'a mut PriorityQueue<PropRef>,
	/// Priority within the queue for each propagator.
	priority: &'a IndexVec<PropRef, PriorityLevel>,
	/// Flag for whether a propagator is enqueued.
	enqueued: &'a mut IndexVec<PropRef, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Statistics collected by the propagation engine.
pub struct PropagationStatistics {
	/// Number of failures detected by a mutation or by a propagator.
	failures: u64,
	/// Number of times a propagator (or reaction) was run.
	propagations: u64,
}

#[derive(Debug, Default)]
/// The state of the engine that can be accessed and changed by propagators.
pub(crate) struct State {
	/// Solver configuration
	pub(crate) config: SolverConfiguration,

	// ---- Trailed Value Infrastructure (e.g., decision variables) ----
	/// Storage for the integer variables
	pub(crate) int_vars: IndexVec<IntVarRef, IntVar>,
	/// Trailed Storage
	///
	/// Includes the domains of the integer variables, and whether propagators
	/// are active.
	pub(crate) trail: Trail,
	/// Whether a propagator is active, propagators that are not active are not
	/// run when they are dequeued.
	pub(crate) active: IndexVec<PropRef, TrailedBool>,
	/// Whether the solver is in a failure state.
	///
	/// Triggered when an inconsistency is detected. The solver must be restored
	/// to an earlier state before any other change can be made.
	pub(crate) failed: bool,
	/// Whether the problem has been proven unsatisfiable while posting its
	/// constraints.
	pub(crate) unsatisfiable: bool,

	// ---- Non-Trailed Infrastructure ----
	/// Propagation statistics
	pub(crate) statistics: PropagationStatistics,

	// ---- Queueing Infrastructure ----
	/// Integer variable enqueueing information
	pub(crate) int_activation: IndexVec<IntVarRef, ActivationList>,
	/// Queue of propagators awaiting action
	pub(crate) propagator_queue: PriorityQueue<PropRef>,
	/// Priority within the queue for each propagator
	pub(crate) propagator_priority: IndexVec<PropRef, PriorityLevel>,
	/// Flag for whether a propagator is enqueued
	pub(crate) enqueued: IndexVec<PropRef, bool>,
}

impl Engine {
	/// Run the scheduled propagators until no more propagators are scheduled, or
	/// until a propagator detects an inconsistency.
	///
	/// When an inconsistency is detected, the queue is emptied and the engine
	/// is marked as failed.
	pub(crate) fn fixpoint(&mut self) -> Result<(), Inconsistency> {
		debug_assert!(!self.state.failed);
		while let Some(prop) = self.state.propagator_queue.pop() {
			self.state.enqueued[prop] = false;
			if !self.state.trail.get_trailed_bool(self.state.active[prop]) {
				continue;
			}
			self.state.statistics.propagations += 1;
			let mut ctx = PropagationContext::new(&mut self.state, prop);
			if let Err(err) = self.propagators[prop].propagate(&mut ctx) {
				debug!(
					propagator = usize::from(prop),
					failures = self.state.statistics.failures + 1,
					"propagation failure"
				);
				self.state.fail();
				return Err(err);
			}
		}
		Ok(())
	}
}

impl Notifier<'_> {
	/// Enqueue all registered propagators that are activated by `condition`.
	fn schedule(&mut self, condition: IntPropCond) {
		for &prop in self.activation.activated_by(condition) {
			if !self.enqueued[prop] {
				self.queue.insert(self.priority[prop], prop);
				self.enqueued[prop] = true;
			}
		}
	}
}

impl DomainListener for Notifier<'_> {
	fn bind(&mut self) {
		self.schedule(IntPropCond::Fixed);
	}
	fn change_bounds(&mut self) {
		self.schedule(IntPropCond::Bounds);
	}
	fn change(&mut self) {
		self.schedule(IntPropCond::Domain);
	}
}

impl PropagationStatistics {
	/// Returns the number of failures detected during propagation.
	pub fn failures(&self) -> u64 {
		self.failures
	}
	/// Returns the number of times a propagator was run.
	pub fn propagations(&self) -> u64 {
		self.propagations
	}
}

impl State {
	/// Remove all propagators from the queue.
	pub(crate) fn clear_queue(&mut self) {
		while let Some(p) = self.propagator_queue.pop() {
			self.enqueued[p] = false;
		}
	}

	/// Switch off a propagator until the trail is restored past this point.
	pub(crate) fn deactivate(&mut self, prop: PropRef) {
		let _ = self.trail.set_trailed_bool(self.active[prop], false);
	}

	/// Enqueue a propagator, if it is not already enqueued.
	pub(crate) fn enqueue(&mut self, prop: PropRef) {
		if !self.enqueued[prop] {
			self.propagator_queue
				.insert(self.propagator_priority[prop], prop);
			self.enqueued[prop] = true;
		}
	}

	/// Mark the state as failed after an inconsistency was detected.
	pub(crate) fn fail(&mut self) {
		self.failed = true;
		self.statistics.failures += 1;
		self.clear_queue();
	}

	/// Create a new integer variable with a domain containing the values of the
	/// given (sorted, non-empty, and disjoint) inclusive ranges.
	pub(crate) fn new_int_var(
		&mut self,
		ranges: &[(IntVal, IntVal)],
		representation: DomainRepresentation,
	) -> IntVarRef {
		let var = IntVar::new(&mut self.trail, ranges, representation);
		let iv = self.int_vars.push(var);
		let r = self.int_activation.push(ActivationList::default());
		debug_assert_eq!(iv, r);
		iv
	}

	/// Allocate the bookkeeping for a new propagator, which will be stored at the
	/// returned reference.
	pub(crate) fn new_propagator(&mut self, priority: PriorityLevel) -> PropRef {
		let active = self.trail.track_bool(true);
		let prop = self.active.push(active);
		let r = self.propagator_priority.push(priority);
		debug_assert_eq!(prop, r);
		let r = self.enqueued.push(false);
		debug_assert_eq!(prop, r);
		prop
	}

	/// Register `prop` to be enqueued when `var` changes according to
	/// `condition`.
	pub(crate) fn register_int(&mut self, var: IntView, prop: PropRef, condition: IntPropCond) {
		match var.0 {
			IntViewInner::VarRef(iv) | IntViewInner::Linear { var: iv, .. } => {
				self.int_activation[iv].add(prop, condition);
			}
			IntViewInner::Const(_) => {}
		}
	}

	/// Restore the state to the moment `mark` was taken, discarding all
	/// scheduled propagators. A failure is discarded, unless `mark` was taken
	/// in the failed state.
	pub(crate) fn restore(&mut self, mark: TrailMark) {
		// A failure is only restored when the trail actually reaches `mark`
		let reached = self.trail.len() >= mark.pos;
		self.trail.restore(mark);
		self.clear_queue();
		self.failed = reached && mark.failed;
	}

	/// Record the current position of the trail, and whether the engine is in a
	/// failed state at that position.
	pub(crate) fn save(&self) -> TrailMark {
		let mut mark = self.trail.mark();
		mark.failed = self.failed;
		mark
	}

	/// Enforce `condition` on the integer view `var`, and schedule the
	/// propagators that are activated by the resulting changes.
	pub(crate) fn set_int(
		&mut self,
		var: IntView,
		condition: IntCondition,
	) -> Result<(), Inconsistency> {
		let (iv, condition) = match var.0 {
			IntViewInner::VarRef(iv) => (iv, condition),
			IntViewInner::Const(c) => {
				return if condition.holds(c) {
					Ok(())
				} else {
					Err(Inconsistency::EmptyDomain)
				};
			}
			IntViewInner::Linear { transformer, var } => {
				match transformer.rev_transform_cond(condition) {
					Ok(cond) => (var, cond),
					Err(true) => return Ok(()),
					Err(false) => return Err(Inconsistency::EmptyDomain),
				}
			}
		};

		let mut notifier = Notifier {
			activation: &self.int_activation[iv],
			queue: &mut self.propagator_queue,
			priority: &self.propagator_priority,
			enqueued: &mut self.enqueued,
		};
		let result = self.int_vars[iv].apply(&mut self.trail, condition, &mut notifier);
		if result.is_err() {
			trace!(int_var = usize::from(iv), ?condition, "domain wipeout");
		}
		result
	}
}

impl InspectionActions for State {
	fn check_int_in_domain(&self, var: IntView, val: IntVal) -> bool {
		match var.0 {
			IntViewInner::VarRef(iv) => self.int_vars[iv].contains(&self.trail, val),
			IntViewInner::Const(i) => i == val,
			IntViewInner::Linear { transformer, var } => {
				transformer.rev_remains_integer(val)
					&& self.int_vars[var].contains(&self.trail, transformer.rev_transform(val))
			}
		}
	}

	fn get_int_lower_bound(&self, var: IntView) -> IntVal {
		match var.0 {
			IntViewInner::VarRef(iv) => self.int_vars[iv].lower_bound(&self.trail),
			IntViewInner::Const(i) => i,
			IntViewInner::Linear { transformer, var } => {
				if transformer.positive_scale() {
					let lb = self.int_vars[var].lower_bound(&self.trail);
					transformer.transform(lb)
				} else {
					let ub = self.int_vars[var].upper_bound(&self.trail);
					transformer.transform(ub)
				}
			}
		}
	}

	fn get_int_size(&self, var: IntView) -> usize {
		match var.0 {
			IntViewInner::VarRef(iv) | IntViewInner::Linear { var: iv, .. } => {
				self.int_vars[iv].size(&self.trail)
			}
			IntViewInner::Const(_) => 1,
		}
	}

	fn get_int_upper_bound(&self, var: IntView) -> IntVal {
		match var.0 {
			IntViewInner::VarRef(iv) => self.int_vars[iv].upper_bound(&self.trail),
			IntViewInner::Const(i) => i,
			IntViewInner::Linear { transformer, var } => {
				if transformer.positive_scale() {
					let ub = self.int_vars[var].upper_bound(&self.trail);
					transformer.transform(ub)
				} else {
					let lb = self.int_vars[var].lower_bound(&self.trail);
					transformer.transform(lb)
				}
			}
		}
	}

	fn get_int_values(&self, var: IntView) -> Vec<IntVal> {
		match var.0 {
			IntViewInner::VarRef(iv) => self.int_vars[iv].values(&self.trail),
			IntViewInner::Const(i) => vec![i],
			IntViewInner::Linear { transformer, var } => {
				let mut values: Vec<IntVal> = self.int_vars[var]
					.values(&self.trail)
					.into_iter()
					.map(|v| transformer.transform(v))
					.collect();
				if !transformer.positive_scale() {
					values.reverse();
				}
				values
			}
		}
	}
}

impl TrailingActions for State {
	delegate! {
		to self.trail {
			fn get_trailed_bool(&self, b: TrailedBool) -> bool;
			fn get_trailed_int(&self, i: TrailedInt) -> IntVal;
			fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool;
			fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal;
		}
	}
}

index_vec::define_index_type! {
	/// Identifies a propagator in a [`crate::Solver`]
	pub struct PropRef = u32;
}
