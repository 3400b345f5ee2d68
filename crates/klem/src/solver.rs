//! Module containing the central solving infrastructure.

pub(crate) mod engine;
pub(crate) mod value;
pub(crate) mod view;

use delegate::delegate;
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
	actions::{InspectionActions, TrailingActions},
	propagator::{Inconsistency, Propagator, Reaction},
	search::Decision,
	solver::{
		engine::{
			activation_list::IntPropCond,
			int_var::{DomainRepresentation, IntCondition},
			queue::PriorityLevel,
			solving_context::{InitializationContext, PropagationContext},
			trail::{TrailMark, TrailedBool, TrailedInt},
			Engine, PropRef, PropagationStatistics,
		},
		view::{IntView, IntViewInner},
	},
	IntSetVal, IntVal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The observable status of the propagation engine.
pub enum EngineStatus {
	/// Changes have been made that have not yet been propagated.
	Pending,
	/// All propagators are at their fixpoint.
	Stable,
	/// An inconsistency was detected, the solver must be restored to an earlier
	/// state before it can be changed again.
	Failed,
	/// Posting a constraint proved that the problem has no solutions.
	Unsatisfiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Statistics related to the initialization of the solver
pub struct InitStatistics {
	/// Number of integer variables represented in the solver
	int_vars: usize,
	/// Number of propagators (including reactions) in the solver
	propagators: usize,
}

#[derive(Debug, Default)]
/// The main solver object, which stores the variables and constraints of a
/// problem, and is used to explore its solutions.
///
/// All state of the solver is kept in this object, multiple solvers can be used
/// independently of each other.
pub struct Solver {
	/// The propagation engine.
	pub(crate) engine: Engine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Structure holding the options used to configure the solver.
pub struct SolverConfiguration {
	/// The data structure used to store the domains of new integer variables.
	domain_representation: DomainRepresentation,
	/// The maximum number of values between the lower and upper bound (inclusive)
	/// of the initial domain of an integer variable.
	max_domain_span: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors returned by the public operations of a [`Solver`].
pub enum SolverError {
	/// The current branch of the search contains no solutions.
	///
	/// The solver must be restored to an earlier state.
	#[error("inconsistency detected: {0}")]
	Inconsistent(#[from] Inconsistency),
	/// The problem was proven to have no solutions while its constraints were
	/// posted.
	#[error("the problem is unsatisfiable")]
	Unsatisfiable,
	/// The solver was asked to make changes while it is in a failed state.
	#[error("the solver must be restored to an earlier state after a failure")]
	RestoreRequired,
	/// An integer variable was created with an empty domain.
	#[error("integer variable cannot be created with an empty domain")]
	EmptyDomain,
	/// An integer variable was created with a domain that spans too many values.
	#[error("integer variable domain spans {span} values, but at most {max} are allowed")]
	DomainTooLarge {
		/// Number of values between the bounds of the requested domain.
		span: u64,
		/// The maximum number of values allowed by the configuration.
		max: u64,
	},
}

impl InitStatistics {
	/// Number of integer variables present in the solver
	pub fn int_vars(&self) -> usize {
		self.int_vars
	}
	/// Number of propagators present in the solver
	pub fn propagators(&self) -> usize {
		self.propagators
	}
}

impl Solver {
	/// Apply a search decision, without propagating its consequences.
	pub fn apply(&mut self, decision: Decision) -> Result<(), SolverError> {
		self.apply_condition(decision.var, decision.condition)
	}

	/// Internal method to enforce a condition on an integer view on behalf of
	/// the user, marking the solver as failed if the condition cannot hold.
	fn apply_condition(&mut self, var: IntView, condition: IntCondition) -> Result<(), SolverError> {
		self.ensure_changeable()?;
		trace!(?var, ?condition, "apply condition");
		if let Err(err) = self.engine.state.set_int(var, condition) {
			self.engine.state.fail();
			return Err(err.into());
		}
		Ok(())
	}

	/// Apply a search decision and propagate its consequences.
	pub fn decide(&mut self, decision: Decision) -> Result<(), SolverError> {
		self.apply(decision)?;
		self.fixpoint()
	}

	/// Internal method that checks whether the user is allowed to make changes
	/// to the solver.
	fn ensure_changeable(&self) -> Result<(), SolverError> {
		if self.engine.state.unsatisfiable {
			Err(SolverError::Unsatisfiable)
		} else if self.engine.state.failed {
			Err(SolverError::RestoreRequired)
		} else {
			Ok(())
		}
	}

	/// Run all scheduled propagators until none of them can make any further
	/// changes.
	///
	/// When an inconsistency is found, all scheduled propagators are discarded
	/// and the solver is marked as failed until it is restored to an earlier
	/// state. Running the fixpoint again directly after it succeeded has no
	/// effect.
	pub fn fixpoint(&mut self) -> Result<(), SolverError> {
		self.ensure_changeable()?;
		self.engine.fixpoint()?;
		Ok(())
	}

	/// Access the initilization statistics of the [`Solver`] object.
	pub fn init_statistics(&self) -> InitStatistics {
		InitStatistics {
			int_vars: self.engine.state.int_vars.len(),
			propagators: self.engine.propagators.len(),
		}
	}

	/// Create a new integer variable with the given domain, stored using the
	/// configured domain representation.
	pub fn new_int_var(&mut self, domain: IntSetVal) -> Result<IntView, SolverError> {
		let representation = self.engine.state.config.domain_representation;
		self.new_int_var_with(domain, representation)
	}

	/// Create a new integer variable with the given domain, stored using the
	/// given domain representation.
	pub fn new_int_var_with(
		&mut self,
		domain: IntSetVal,
		representation: DomainRepresentation,
	) -> Result<IntView, SolverError> {
		let ranges = domain
			.iter()
			.map(|r| (*r.start(), *r.end()))
			.filter(|(lb, ub)| lb <= ub)
			.collect_vec();
		let (Some(&(lb, _)), Some(&(_, ub))) = (ranges.first(), ranges.last()) else {
			return Err(SolverError::EmptyDomain);
		};
		let span = ub.abs_diff(lb).saturating_add(1);
		let max = self.engine.state.config.max_domain_span;
		if span > max {
			return Err(SolverError::DomainTooLarge { span, max });
		}

		let iv = self.engine.state.new_int_var(&ranges, representation);
		debug!(
			int_var = usize::from(iv),
			lb,
			ub,
			size = self.engine.state.int_vars[iv].size(&self.engine.state.trail),
			?representation,
			"create integer variable"
		);
		Ok(IntView(IntViewInner::VarRef(iv)))
	}

	/// Create a new trailed Boolean value, which is restored when the solver is
	/// restored to an earlier state.
	pub fn new_trailed_bool(&mut self, init: bool) -> TrailedBool {
		self.engine.state.trail.track_bool(init)
	}

	/// Create a new trailed integer value, which is restored when the solver is
	/// restored to an earlier state.
	pub fn new_trailed_int(&mut self, init: IntVal) -> TrailedInt {
		self.engine.state.trail.track_int(init)
	}

	/// Post a new constraint to the solver.
	///
	/// The [`Propagator::setup`] method of the constraint is called once, to
	/// perform its initial filtering and to register the events on which it
	/// must be run, after which the consequences are propagated.
	///
	/// Constraints are meant to be posted before the search starts: an
	/// inconsistency found while posting proves that the problem has no
	/// solutions, and the solver remains unsatisfiable from then on.
	pub fn post<C>(&mut self, constraint: C) -> Result<PropRef, SolverError>
	where
		C: for<'a> Propagator<InitializationContext<'a>, PropagationContext<'a>> + 'static,
	{
		self.ensure_changeable()?;
		let mut constraint = constraint;
		let prop = self.engine.state.new_propagator(PriorityLevel::default());
		let mut ctx = InitializationContext::new(&mut self.engine.state, prop);
		let result = constraint.setup(&mut ctx);
		let reactions = ctx.reactions;

		let r = self.engine.propagators.push(Box::new(constraint));
		debug_assert_eq!(prop, r);
		for (rref, reaction) in reactions {
			let r = self.engine.propagators.push(Box::new(reaction));
			debug_assert_eq!(rref, r);
		}
		debug!(
			propagator = usize::from(prop),
			priority = ?self.engine.state.propagator_priority[prop],
			"post propagator"
		);

		let result = match result {
			Ok(()) => self.engine.fixpoint(),
			Err(err) => {
				self.engine.state.fail();
				Err(err)
			}
		};
		if let Err(err) = result {
			debug!(propagator = usize::from(prop), %err, "problem proven unsatisfiable");
			self.engine.state.unsatisfiable = true;
			return Err(SolverError::Unsatisfiable);
		}
		Ok(prop)
	}

	/// Access the propagation statistics of the solver up to this point.
	pub fn propagation_statistics(&self) -> &PropagationStatistics {
		&self.engine.state.statistics
	}

	/// Internal method to register a user reaction.
	fn register_reaction<F>(&mut self, var: IntView, condition: IntPropCond, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		let prop = self
			.engine
			.state
			.new_propagator(PriorityLevel::Immediate);
		self.engine.state.register_int(var, prop, condition);
		let r = self.engine.propagators.push(Box::new(Reaction::new(reaction)));
		debug_assert_eq!(prop, r);
	}

	/// Restore the solver to the state it was in when `mark` was saved.
	///
	/// Any scheduled propagators are discarded, and a failure state is cleared.
	/// A mark saved while the solver was failed restores the failure as well, so
	/// the solver must then be restored to an earlier mark. Nothing is undone if
	/// the solver is already at (or before) `mark`.
	pub fn restore_state(&mut self, mark: TrailMark) {
		trace!(?mark, "restore state");
		self.engine.state.restore(mark);
	}

	/// Save the current state of the solver, so it can later be restored.
	///
	/// Saving the state of a failed solver is allowed, but restoring to such a
	/// mark leaves the solver failed.
	pub fn save_state(&self) -> TrailMark {
		let mark = self.engine.state.save();
		trace!(?mark, "save state");
		mark
	}

	/// Enforce that an integer view is at least `val`.
	pub fn set_int_lower_bound(&mut self, var: IntView, val: IntVal) -> Result<(), SolverError> {
		self.apply_condition(var, IntCondition::GreaterEq(val))
	}

	/// Enforce that an integer view is not equal to `val`.
	pub fn set_int_not_eq(&mut self, var: IntView, val: IntVal) -> Result<(), SolverError> {
		self.apply_condition(var, IntCondition::NotEq(val))
	}

	/// Enforce that an integer view is at most `val`.
	pub fn set_int_upper_bound(&mut self, var: IntView, val: IntVal) -> Result<(), SolverError> {
		match IntCondition::at_most(val) {
			Some(cond) => self.apply_condition(var, cond),
			None => self.ensure_changeable(),
		}
	}

	/// Enforce that an integer view is equal to `val`.
	pub fn set_int_val(&mut self, var: IntView, val: IntVal) -> Result<(), SolverError> {
		self.apply_condition(var, IntCondition::Eq(val))
	}

	/// Returns the current status of the solver.
	pub fn status(&self) -> EngineStatus {
		let state = &self.engine.state;
		if state.unsatisfiable {
			EngineStatus::Unsatisfiable
		} else if state.failed {
			EngineStatus::Failed
		} else if state.propagator_queue.is_empty() {
			EngineStatus::Stable
		} else {
			EngineStatus::Pending
		}
	}

	/// Register a closure that is called whenever the lower or upper bound of
	/// `var` changes.
	pub fn when_bounds_change<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.register_reaction(var, IntPropCond::Bounds, reaction);
	}

	/// Register a closure that is called whenever a value is removed from the
	/// domain of `var`.
	pub fn when_domain_change<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.register_reaction(var, IntPropCond::Domain, reaction);
	}

	/// Register a closure that is called whenever `var` becomes fixed.
	pub fn when_fixed<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.register_reaction(var, IntPropCond::Fixed, reaction);
	}

	/// Create a new solver using the given configuration.
	pub fn with_configuration(config: SolverConfiguration) -> Self {
		let mut slv = Self::default();
		slv.engine.state.config = config;
		slv
	}
}

impl InspectionActions for Solver {
	delegate! {
		to self.engine.state {
			fn check_int_in_domain(&self, var: IntView, val: IntVal) -> bool;
			fn get_int_lower_bound(&self, var: IntView) -> IntVal;
			fn get_int_size(&self, var: IntView) -> usize;
			fn get_int_upper_bound(&self, var: IntView) -> IntVal;
			fn get_int_values(&self, var: IntView) -> Vec<IntVal>;
		}
	}
}

impl TrailingActions for Solver {
	delegate! {
		to self.engine.state {
			fn get_trailed_bool(&self, b: TrailedBool) -> bool;
			fn get_trailed_int(&self, i: TrailedInt) -> IntVal;
			fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool;
			fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal;
		}
	}
}

impl SolverConfiguration {
	/// Returns the data structure used to store the domains of new integer
	/// variables.
	pub fn domain_representation(&self) -> DomainRepresentation {
		self.domain_representation
	}

	/// Returns the maximum number of values between the bounds of the initial
	/// domain of an integer variable.
	pub fn max_domain_span(&self) -> u64 {
		self.max_domain_span
	}

	/// Change the data structure used to store the domains of new integer
	/// variables.
	pub fn with_domain_representation(mut self, representation: DomainRepresentation) -> Self {
		self.domain_representation = representation;
		self
	}

	/// Change the maximum number of values between the bounds of the initial
	/// domain of an integer variable.
	///
	/// The limit is capped at the largest span that any domain representation
	/// can store.
	pub fn with_max_domain_span(mut self, span: u64) -> Self {
		self.max_domain_span = span.min(u32::MAX as u64);
		self
	}
}

impl Default for SolverConfiguration {
	fn default() -> Self {
		Self {
			domain_representation: DomainRepresentation::default(),
			max_domain_span: 1 << 24,
		}
	}
}
