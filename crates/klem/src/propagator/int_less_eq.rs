//! Propagator for the `int_le` constraint, which enforces that an integer view
//! is at most another integer view.

use crate::{
	actions::{InitializationActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::{
		engine::{activation_list::IntPropCond, queue::PriorityLevel},
		view::IntView,
	},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Bounds consistent propagator for the `int_le` constraint, `x ≤ y`.
pub struct IntLessEq {
	/// The smaller side of the inequality.
	x: IntView,
	/// The larger side of the inequality.
	y: IntView,
}

impl IntLessEq {
	/// Create a new [`IntLessEq`] propagator enforcing `x ≤ y`.
	pub fn new(x: IntView, y: IntView) -> Self {
		Self { x, y }
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for IntLessEq {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		actions.set_priority(PriorityLevel::High);
		actions.enqueue_on_int_change(self.x, IntPropCond::Bounds);
		actions.enqueue_on_int_change(self.y, IntPropCond::Bounds);
		actions.enqueue_now();
		Ok(())
	}

	#[tracing::instrument(name = "int_le", level = "trace", skip(self, actions))]
	fn propagate(&mut self, actions: &mut P) -> Result<(), Inconsistency> {
		let y_ub = actions.get_int_upper_bound(self.y);
		actions.set_int_upper_bound(self.x, y_ub)?;
		let x_lb = actions.get_int_lower_bound(self.x);
		actions.set_int_lower_bound(self.y, x_lb)?;

		// The constraint is entailed
		if actions.get_int_upper_bound(self.x) <= actions.get_int_lower_bound(self.y) {
			actions.deactivate();
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use tracing_test::traced_test;

	use crate::{actions::InspectionActions, less_eq_int, Solver, SolverError};

	#[test]
	#[traced_test]
	fn test_less_eq_sat() {
		let mut slv = Solver::default();
		let x = slv.new_int_var((1..=3).into()).unwrap();
		let y = slv.new_int_var((0..=2).into()).unwrap();
		let _ = slv.post(less_eq_int(x, y)).unwrap();

		assert_eq!(slv.get_int_bounds(x), (1, 2));
		assert_eq!(slv.get_int_bounds(y), (1, 2));
		slv.expect_solutions(
			&[x, y],
			expect![[r#"
			1, 1
			1, 2
			2, 2"#]],
		);
	}

	#[test]
	#[traced_test]
	fn test_less_eq_unsat() {
		let mut slv = Solver::default();
		let x = slv.new_int_var((4..=6).into()).unwrap();
		let y = slv.new_int_var((0..=5).into()).unwrap();
		assert_eq!(
			slv.post(less_eq_int(x, y + -2)),
			Err(SolverError::Unsatisfiable)
		);
	}

	#[test]
	#[traced_test]
	fn test_less_eq_deactivation_is_restored() {
		let mut slv = Solver::default();
		let x = slv.new_int_var((0..=4).into()).unwrap();
		let y = slv.new_int_var((0..=4).into()).unwrap();
		let _ = slv.post(less_eq_int(x, y)).unwrap();

		let mark = slv.save_state();
		slv.set_int_upper_bound(x, 1).unwrap();
		slv.set_int_lower_bound(y, 2).unwrap();
		slv.fixpoint().unwrap();
		// Entailed, the propagator no longer reacts to changes
		let runs = slv.propagation_statistics().propagations();
		slv.set_int_upper_bound(y, 3).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(slv.propagation_statistics().propagations(), runs);

		slv.restore_state(mark);
		slv.set_int_upper_bound(y, 2).unwrap();
		slv.fixpoint().unwrap();
		// Rescheduled once by its own change to the upper bound of x
		assert_eq!(slv.propagation_statistics().propagations(), runs + 2);
		assert_eq!(slv.get_int_bounds(x), (0, 2));
	}
}
