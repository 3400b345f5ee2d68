//! Contexts through which propagators interact with the state of the engine,
//! both when they are set up and when they are run.

use std::fmt;

use delegate::delegate;

use crate::{
	actions::{InitializationActions, InspectionActions, PropagationActions, TrailingActions},
	propagator::{Inconsistency, Reaction},
	solver::{
		engine::{
			activation_list::IntPropCond,
			int_var::IntCondition,
			queue::PriorityLevel,
			trail::{TrailedBool, TrailedInt},
			PropRef, State,
		},
		view::IntView,
	},
	IntVal,
};

/// The context given to [`crate::Propagator::setup`] when a propagator is
/// posted to the solver.
pub struct InitializationContext<'a> {
	/// The state of the engine.
	pub(crate) state: &'a mut State,
	/// The propagator that is being set up.
	pub(crate) prop: PropRef,
	/// Reactions registered during the set up, with the reference at which they
	/// must be stored.
	pub(crate) reactions: Vec<(PropRef, Reaction)>,
}

/// The context given to [`crate::Propagator::propagate`] (and to reactions)
/// when they are run by the engine.
pub struct PropagationContext<'a> {
	/// The state of the engine.
	pub(crate) state: &'a mut State,
	/// The propagator that is currently running.
	pub(crate) prop: PropRef,
}

impl<'a> InitializationContext<'a> {
	/// Create a new context to set up the propagator `prop`.
	pub(crate) fn new(state: &'a mut State, prop: PropRef) -> Self {
		Self {
			state,
			prop,
			reactions: Vec::new(),
		}
	}
}

impl fmt::Debug for InitializationContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InitializationContext")
			.field("prop", &self.prop)
			.field("reactions", &self.reactions.len())
			.finish_non_exhaustive()
	}
}

impl InitializationActions for InitializationContext<'_> {
	fn add_reaction<F>(&mut self, var: IntView, condition: IntPropCond, reaction: F)
	where
		F: for<'b> FnMut(&mut PropagationContext<'b>) -> Result<(), Inconsistency> + 'static,
	{
		let r = self.state.new_propagator(PriorityLevel::Immediate);
		self.state.register_int(var, r, condition);
		self.reactions.push((r, Reaction::new(reaction)));
	}

	fn enqueue_now(&mut self) {
		self.state.enqueue(self.prop);
	}

	fn enqueue_on_int_change(&mut self, var: IntView, condition: IntPropCond) {
		self.state.register_int(var, self.prop, condition);
	}

	fn new_trailed_bool(&mut self, init: bool) -> TrailedBool {
		self.state.trail.track_bool(init)
	}

	fn new_trailed_int(&mut self, init: IntVal) -> TrailedInt {
		self.state.trail.track_int(init)
	}

	fn set_priority(&mut self, priority: PriorityLevel) {
		self.state.propagator_priority[self.prop] = priority;
	}
}

impl InspectionActions for InitializationContext<'_> {
	delegate! {
		to self.state {
			fn check_int_in_domain(&self, var: IntView, val: IntVal) -> bool;
			fn get_int_lower_bound(&self, var: IntView) -> IntVal;
			fn get_int_size(&self, var: IntView) -> usize;
			fn get_int_upper_bound(&self, var: IntView) -> IntVal;
			fn get_int_values(&self, var: IntView) -> Vec<IntVal>;
		}
	}
}

impl PropagationActions for InitializationContext<'_> {
	fn deactivate(&mut self) {
		self.state.deactivate(self.prop);
	}

	fn set_int_lower_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::GreaterEq(val))
	}

	fn set_int_not_eq(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::NotEq(val))
	}

	fn set_int_upper_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		match IntCondition::at_most(val) {
			Some(cond) => self.state.set_int(var, cond),
			None => Ok(()),
		}
	}

	fn set_int_val(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::Eq(val))
	}
}

impl TrailingActions for InitializationContext<'_> {
	delegate! {
		to self.state {
			fn get_trailed_bool(&self, b: TrailedBool) -> bool;
			fn get_trailed_int(&self, i: TrailedInt) -> IntVal;
			fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool;
			fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal;
		}
	}
}

impl<'a> PropagationContext<'a> {
	/// Create a new context to run the propagator `prop`.
	pub(crate) fn new(state: &'a mut State, prop: PropRef) -> Self {
		Self { state, prop }
	}
}

impl fmt::Debug for PropagationContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PropagationContext")
			.field("prop", &self.prop)
			.finish_non_exhaustive()
	}
}

impl InspectionActions for PropagationContext<'_> {
	delegate! {
		to self.state {
			fn check_int_in_domain(&self, var: IntView, val: IntVal) -> bool;
			fn get_int_lower_bound(&self, var: IntView) -> IntVal;
			fn get_int_size(&self, var: IntView) -> usize;
			fn get_int_upper_bound(&self, var: IntView) -> IntVal;
			fn get_int_values(&self, var: IntView) -> Vec<IntVal>;
		}
	}
}

impl PropagationActions for PropagationContext<'_> {
	fn deactivate(&mut self) {
		self.state.deactivate(self.prop);
	}

	fn set_int_lower_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::GreaterEq(val))
	}

	fn set_int_not_eq(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::NotEq(val))
	}

	fn set_int_upper_bound(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		match IntCondition::at_most(val) {
			Some(cond) => self.state.set_int(var, cond),
			None => Ok(()),
		}
	}

	fn set_int_val(&mut self, var: IntView, val: IntVal) -> Result<(), Inconsistency> {
		self.state.set_int(var, IntCondition::Eq(val))
	}
}

impl TrailingActions for PropagationContext<'_> {
	delegate! {
		to self.state {
			fn get_trailed_bool(&self, b: TrailedBool) -> bool;
			fn get_trailed_int(&self, i: TrailedInt) -> IntVal;
			fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool;
			fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal;
		}
	}
}
