//! Propagator for the `all_different_int` constraint, which enforces that a
//! collection of integer views all take different values.

use std::rc::Rc;

use itertools::Itertools;

use crate::{
	actions::{InitializationActions, InspectionActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::view::IntView,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Forward checking propagator for the `all_different_int` constraint.
///
/// Whenever a view is fixed, its value is removed from all other views.
pub struct AllDifferentInt {
	/// Views that must take different values.
	vars: Vec<IntView>,
}

impl AllDifferentInt {
	/// Create a new [`AllDifferentInt`] propagator over the given views.
	pub fn new<V: Into<IntView>, VI: IntoIterator<Item = V>>(vars: VI) -> Self {
		Self {
			vars: vars.into_iter().map(Into::into).collect(),
		}
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for AllDifferentInt {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		// Reactions are registered first, so views that become fixed by the
		// removals below are handled by them.
		let vars: Rc<[IntView]> = self.vars.clone().into();
		for (i, &v) in self.vars.iter().enumerate() {
			let others = Rc::clone(&vars);
			actions.when_fixed(v, move |ctx| {
				let Some(val) = ctx.get_int_val(v) else {
					return Ok(());
				};
				for (j, &w) in others.iter().enumerate() {
					if i != j {
						ctx.set_int_not_eq(w, val)?;
					}
				}
				Ok(())
			});
		}

		let fixed = self
			.vars
			.iter()
			.enumerate()
			.filter_map(|(i, &v)| actions.get_int_val(v).map(|val| (i, val)))
			.collect_vec();
		if !fixed.iter().map(|&(_, val)| val).all_unique() {
			return Err(Inconsistency::Violated);
		}
		for &(i, val) in &fixed {
			for (j, &w) in self.vars.iter().enumerate() {
				if i != j {
					actions.set_int_not_eq(w, val)?;
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use itertools::Itertools;
	use tracing_test::traced_test;

	use crate::{
		actions::InspectionActions, all_different_int, equal_int, IntView, Solver, SolverError,
	};

	#[test]
	#[traced_test]
	fn test_all_different_sat() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((1..=3).into()).unwrap();
		let b = slv.new_int_var((1..=3).into()).unwrap();
		let c = slv.new_int_var((1..=3).into()).unwrap();
		let _ = slv.post(all_different_int([a, b, c])).unwrap();

		slv.expect_solutions(
			&[a, b, c],
			expect![[r#"
			1, 2, 3
			1, 3, 2
			2, 1, 3
			2, 3, 1
			3, 1, 2
			3, 2, 1"#]],
		);
	}

	#[test]
	#[traced_test]
	fn test_all_different_fixed_duplicates() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((0..=3).into()).unwrap();
		assert_eq!(
			slv.post(all_different_int([a, IntView::from(2), IntView::from(2)])),
			Err(SolverError::Unsatisfiable)
		);
	}

	#[test]
	#[traced_test]
	fn test_all_different_fixed_during_setup() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((1..=1).into()).unwrap();
		let b = slv.new_int_var((1..=2).into()).unwrap();
		let c = slv.new_int_var((1..=2).into()).unwrap();
		assert_eq!(
			slv.post(all_different_int([a, b, c])),
			Err(SolverError::Unsatisfiable)
		);

		let mut slv = Solver::default();
		let vars = (1..=4)
			.map(|n| slv.new_int_var((1..=n).into()).unwrap())
			.collect_vec();
		let _ = slv.post(all_different_int(vars.iter().rev().copied())).unwrap();
		assert_eq!(
			vars.iter().map(|&v| slv.get_int_val(v)).collect_vec(),
			vec![Some(1), Some(2), Some(3), Some(4)]
		);
	}

	#[test]
	#[traced_test]
	fn test_all_different_forward_checking() {
		let mut slv = Solver::default();
		let vars = (0..4)
			.map(|_| slv.new_int_var((0..=3).into()).unwrap())
			.collect_vec();
		let _ = slv.post(all_different_int(vars.clone())).unwrap();
		// Fixed by another propagator
		let _ = slv.post(equal_int(vars[0], IntView::from(1))).unwrap();
		slv.set_int_val(vars[1], 3).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(slv.get_int_values(vars[2]), vec![0, 2]);
		assert_eq!(slv.get_int_values(vars[3]), vec![0, 2]);

		slv.set_int_val(vars[2], 2).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(slv.get_int_val(vars[3]), Some(0));
	}
}
