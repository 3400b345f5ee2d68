//! # Klem - A Trail-Based Constraint Propagation Engine
//!
//! Klem is a small constraint programming solver for finite domain integer
//! variables. Constraints are enforced by propagators, which remove values
//! from the domains of variables until no propagator can make any further
//! change. Every change is recorded on a trail, which allows the solver to be
//! restored to any earlier state in constant time per recorded change. This
//! makes it possible to explore a search tree in a depth-first manner, without
//! ever copying the state of the solver.
//!
//! The [`Solver`] stores the variables and constraints of a problem. Variables
//! are referenced using an [`IntView`], constraints are created using the
//! functions in this module (e.g., [`not_equal_int`]), or by implementing the
//! [`Propagator`] trait, and are added using [`Solver::post`]. Solutions are
//! found using [`search::DepthFirstSearch`].

pub mod actions;
pub mod branchers;
pub(crate) mod helpers;
pub mod propagator;
pub mod search;
pub mod solver;
#[cfg(test)]
pub(crate) mod tests;

pub use crate::{
	propagator::{
		all_different_int::AllDifferentInt, int_abs::IntAbs, int_equal::IntEqual,
		int_less_eq::IntLessEq, int_linear_eq::IntLinearEq, int_not_equal::IntNotEqual,
		Inconsistency, Propagator,
	},
	solver::{
		engine::{
			activation_list::IntPropCond,
			int_var::{DomainRepresentation, IntCondition},
			queue::PriorityLevel,
			solving_context::{InitializationContext, PropagationContext},
			trail::{TrailMark, TrailedBool, TrailedInt},
			PropRef, PropagationStatistics,
		},
		value::{IntSetVal, IntVal, NonZeroIntVal},
		view::IntView,
		EngineStatus, InitStatistics, Solver, SolverConfiguration, SolverError,
	},
};

/// Create a constraint that enforces that the absolute value of `x` is `y`.
pub fn abs_int(x: impl Into<IntView>, y: impl Into<IntView>) -> IntAbs {
	IntAbs::new(x.into(), y.into())
}

/// Create a constraint that enforces that all given integer views take
/// different values.
pub fn all_different_int<V: Into<IntView>, VI: IntoIterator<Item = V>>(
	vars: VI,
) -> AllDifferentInt {
	AllDifferentInt::new(vars)
}

/// Create a constraint that enforces that `x` and `y` take the same value.
pub fn equal_int(x: impl Into<IntView>, y: impl Into<IntView>) -> IntEqual {
	IntEqual::new(x.into(), y.into())
}

/// Create a constraint that enforces that `x` is at most `y`.
pub fn less_eq_int(x: impl Into<IntView>, y: impl Into<IntView>) -> IntLessEq {
	IntLessEq::new(x.into(), y.into())
}

/// Create a constraint that enforces that the sum of the given integer views
/// equals `rhs`.
pub fn linear_eq_int<V: Into<IntView>, VI: IntoIterator<Item = V>>(
	vars: VI,
	rhs: IntVal,
) -> IntLinearEq {
	IntLinearEq::new(vars, rhs)
}

/// Create a constraint that enforces that `x` and `y` take different values.
pub fn not_equal_int(x: impl Into<IntView>, y: impl Into<IntView>) -> IntNotEqual {
	IntNotEqual::new(x.into(), y.into())
}
