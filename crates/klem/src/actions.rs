//! Traits that encapsulate different sets of actions that can be performed at
//! different phases and by different objects in the solving process.

use crate::{
	propagator::Inconsistency,
	solver::{
		engine::{
			activation_list::IntPropCond,
			queue::PriorityLevel,
			solving_context::PropagationContext,
			trail::{TrailedBool, TrailedInt},
		},
		view::IntView,
	},
	IntVal,
};

/// Actions that can be performed when a propagator is set up, when it is first
/// posted to the solver.
pub trait InitializationActions: PropagationActions {
	/// Register a closure that is called whenever `var` changes according to
	/// `condition`.
	///
	/// The closure is called before any other scheduled propagator, and remains
	/// registered when the solver backtracks. Reactions registered on constant
	/// views are never called.
	fn add_reaction<F>(&mut self, var: IntView, condition: IntPropCond, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static;

	/// Schedule the propagator being set up to be run in the fixpoint that
	/// follows its posting.
	fn enqueue_now(&mut self);

	/// Schedule the propagator being set up whenever `var` changes according to
	/// `condition`.
	fn enqueue_on_int_change(&mut self, var: IntView, condition: IntPropCond);

	/// Create a new trailed Boolean value with the given initial value.
	fn new_trailed_bool(&mut self, init: bool) -> TrailedBool;

	/// Create a new trailed integer value with the given initial value.
	fn new_trailed_int(&mut self, init: IntVal) -> TrailedInt;

	/// Set the priority with which the propagator being set up is scheduled.
	fn set_priority(&mut self, priority: PriorityLevel);

	/// Register a closure that is called whenever a value is removed from the
	/// domain of `var`.
	fn when_domain_change<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.add_reaction(var, IntPropCond::Domain, reaction);
	}

	/// Register a closure that is called whenever the lower or upper bound of
	/// `var` changes.
	fn when_bounds_change<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.add_reaction(var, IntPropCond::Bounds, reaction);
	}

	/// Register a closure that is called whenever `var` becomes fixed.
	fn when_fixed<F>(&mut self, var: IntView, reaction: F)
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		self.add_reaction(var, IntPropCond::Fixed, reaction);
	}
}

/// Actions that can be used to inspect the current domains of integer views.
pub trait InspectionActions: TrailingActions {
	/// Check whether a given integer view can take a given value.
	fn check_int_in_domain(&self, var: IntView, val: IntVal) -> bool;

	/// Get the lower and upper bound of an integer view.
	fn get_int_bounds(&self, var: IntView) -> (IntVal, IntVal) {
		(self.get_int_lower_bound(var), self.get_int_upper_bound(var))
	}

	/// Get the lower bound of an integer view.
	fn get_int_lower_bound(&self, var: IntView) -> IntVal;

	/// Get the number of values an integer view can take.
	fn get_int_size(&self, var: IntView) -> usize;

	/// Get the upper bound of an integer view.
	fn get_int_upper_bound(&self, var: IntView) -> IntVal;

	/// Get the value of an integer view, if it is fixed.
	fn get_int_val(&self, var: IntView) -> Option<IntVal> {
		let (lb, ub) = self.get_int_bounds(var);
		if lb == ub {
			Some(lb)
		} else {
			None
		}
	}

	/// Get all values an integer view can take, in increasing order.
	fn get_int_values(&self, var: IntView) -> Vec<IntVal>;

	/// Check whether an integer view is fixed to a single value.
	fn is_fixed(&self, var: IntView) -> bool {
		self.get_int_size(var) == 1
	}
}

/// Actions that can be performed during propagation.
///
/// Each mutation returns an [`Inconsistency`] (and leaves the domain
/// unchanged) when it would remove all values of a view.
pub trait PropagationActions: InspectionActions {
	/// Switch off the current propagator until the solver backtracks past the
	/// current state.
	fn deactivate(&mut self);

	/// Enforce that an integer view is at least `val`.
	fn set_int_lower_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency>;

	/// Enforce that an integer view is not equal to `val`.
	fn set_int_not_eq(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency>;

	/// Enforce that an integer view is at most `val`.
	fn set_int_upper_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency>;

	/// Enforce that an integer view is equal to `val`.
	fn set_int_val(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency>;
}

/// Actions to read and write reversible values, which are restored when the
/// solver backtracks.
pub trait TrailingActions {
	/// Get the current value of a trailed Boolean.
	fn get_trailed_bool(&self, b: TrailedBool) -> bool;
	/// Get the current value of a trailed integer.
	fn get_trailed_int(&self, i: TrailedInt) -> IntVal;
	/// Change the value of a trailed Boolean, returning its previous value.
	fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool;
	/// Change the value of a trailed integer, returning its previous value.
	fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal;
}
