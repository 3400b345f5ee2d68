//! Module containing the definitions for propagators and their implementations.

pub(crate) mod all_different_int;
pub(crate) mod int_abs;
pub(crate) mod int_equal;
pub(crate) mod int_less_eq;
pub(crate) mod int_linear_eq;
pub(crate) mod int_not_equal;

use std::fmt::{self, Debug};

use thiserror::Error;

use crate::{
	actions::{InitializationActions, PropagationActions},
	solver::engine::solving_context::{InitializationContext, PropagationContext},
};

/// A boxed propagator as it is stored by the propagation engine.
pub(crate) type BoxedPropagator =
	Box<dyn for<'a> Propagator<InitializationContext<'a>, PropagationContext<'a>>>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The failure signal that is raised when the current state of the solver
/// cannot contain a solution.
///
/// An inconsistency always ends the current fixpoint. The solver has to be
/// restored to an earlier state to recover from it.
pub enum Inconsistency {
	/// A mutation would have removed all values from the domain of a variable.
	#[error("domain wipeout")]
	EmptyDomain,
	/// A propagator detected that its constraint can no longer be satisfied.
	#[error("constraint violated")]
	Violated,
}

/// A trait for a propagator that is called during the search process to filter
/// the domains of decision variables, and detect inconsistencies.
///
/// A propagator is set up once when it is posted. During its set up, it can
/// filter domains, and register the events that schedule it (or that run
/// reactions on its behalf). Afterwards, [`Propagator::propagate`] is called
/// whenever it was scheduled.
pub trait Propagator<I: InitializationActions, P: PropagationActions>: Debug {
	/// The setup method is called once when the propagator is posted, and must
	/// register the events on which the propagator needs to be run.
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency>;

	/// The propagate method is called during the search process to allow the
	/// propagator to enforce its constraint.
	fn propagate(&mut self, actions: &mut P) -> Result<(), Inconsistency> {
		let _ = actions;
		Ok(())
	}
}

/// A closure that is run as a propagator whenever the event it was registered
/// for occurs.
pub(crate) struct Reaction {
	/// The function that is called when the reaction is run.
	f: Box<dyn for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency>>,
}

impl Reaction {
	/// Wrap a closure so it can be stored by the engine.
	pub(crate) fn new<F>(f: F) -> Self
	where
		F: for<'a> FnMut(&mut PropagationContext<'a>) -> Result<(), Inconsistency> + 'static,
	{
		Self { f: Box::new(f) }
	}
}

impl Debug for Reaction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reaction").finish_non_exhaustive()
	}
}

impl<'b, I: InitializationActions> Propagator<I, PropagationContext<'b>> for Reaction {
	fn setup(&mut self, _: &mut I) -> Result<(), Inconsistency> {
		Ok(())
	}

	fn propagate(&mut self, actions: &mut PropagationContext<'b>) -> Result<(), Inconsistency> {
		(self.f)(actions)
	}
}
