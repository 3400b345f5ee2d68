//! Propagator for the `int_lin_eq` constraint. This constraint enforces that
//! the sum of a collection of integer views is equal to a given value.

use crate::{
	actions::{InitializationActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::{
		engine::{activation_list::IntPropCond, queue::PriorityLevel, trail::TrailedInt},
		view::{IntView, IntViewInner},
	},
	IntVal,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Bounds consistent propagator for the `int_lin_eq` constraint, `Σ vars =
/// rhs`.
///
/// Scaled terms are expressed using views, e.g. `2x - y = 3` is
/// `IntLinearEq::new([x * 2, -y], 3)`.
pub struct IntLinearEq {
	/// Views that are summed.
	vars: Vec<IntView>,
	/// The value the sum must equal.
	rhs: IntVal,
	/// Permutation of the indices of `vars`, where the first `num_unfixed`
	/// elements are the views that were not yet fixed at the last propagation.
	unfixed: Vec<usize>,
	/// Reversible bookkeeping of the fixed views, allocated during setup.
	fixed: Option<FixedPrefix>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Trailed values that summarize the views that are known to be fixed.
struct FixedPrefix {
	/// Number of views at the front of [`IntLinearEq::unfixed`] that are not
	/// fixed.
	num_unfixed: TrailedInt,
	/// Sum of the values of the fixed views.
	sum: TrailedInt,
}

impl IntLinearEq {
	/// Create a new [`IntLinearEq`] propagator enforcing `Σ vars = rhs`.
	///
	/// Constant views are moved into the right hand side.
	pub fn new<V: Into<IntView>, VI: IntoIterator<Item = V>>(vars: VI, mut rhs: IntVal) -> Self {
		let vars: Vec<IntView> = vars
			.into_iter()
			.filter_map(|v| {
				let v = v.into();
				if let IntViewInner::Const(c) = v.0 {
					rhs -= c;
					None
				} else {
					Some(v)
				}
			})
			.collect();
		Self {
			unfixed: (0..vars.len()).collect(),
			vars,
			rhs,
			fixed: None,
		}
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for IntLinearEq {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		self.fixed = Some(FixedPrefix {
			num_unfixed: actions.new_trailed_int(self.vars.len() as IntVal),
			sum: actions.new_trailed_int(0),
		});
		for &v in &self.vars {
			actions.enqueue_on_int_change(v, IntPropCond::Bounds);
		}
		actions.set_priority(PriorityLevel::Low);
		actions.enqueue_now();
		Ok(())
	}

	// propagation rule: rhs - Σ_{j≠i} ub(x_j) <= x_i <= rhs - Σ_{j≠i} lb(x_j)
	#[tracing::instrument(name = "int_lin_eq", level = "trace", skip(self, actions))]
	fn propagate(&mut self, actions: &mut P) -> Result<(), Inconsistency> {
		let (mut num_unfixed, mut fixed_sum) = match self.fixed {
			Some(prefix) => (
				actions.get_trailed_int(prefix.num_unfixed) as usize,
				actions.get_trailed_int(prefix.sum),
			),
			None => (self.unfixed.len(), 0),
		};

		// Move newly fixed views out of the unfixed prefix and compute the bounds
		// of the sum
		let (mut sum_min, mut sum_max) = (fixed_sum, fixed_sum);
		for i in (0..num_unfixed).rev() {
			let (lb, ub) = actions.get_int_bounds(self.vars[self.unfixed[i]]);
			sum_min += lb;
			sum_max += ub;
			if lb == ub {
				fixed_sum += lb;
				self.unfixed.swap(i, num_unfixed - 1);
				num_unfixed -= 1;
			}
		}
		if let Some(prefix) = self.fixed {
			let _ = actions.set_trailed_int(prefix.num_unfixed, num_unfixed as IntVal);
			let _ = actions.set_trailed_int(prefix.sum, fixed_sum);
		}

		if sum_min > self.rhs || sum_max < self.rhs {
			return Err(Inconsistency::Violated);
		}
		if num_unfixed == 0 {
			actions.deactivate();
			return Ok(());
		}
		for &i in &self.unfixed[..num_unfixed] {
			let v = self.vars[i];
			let (lb, ub) = actions.get_int_bounds(v);
			actions.set_int_upper_bound(v, self.rhs - (sum_min - lb))?;
			actions.set_int_lower_bound(v, self.rhs - (sum_max - ub))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use tracing_test::traced_test;

	use crate::{
		actions::InspectionActions, linear_eq_int, IntView, NonZeroIntVal, Solver, SolverError,
	};

	#[test]
	#[traced_test]
	fn test_linear_eq_sat() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((1..=3).into()).unwrap();
		let b = slv.new_int_var((1..=3).into()).unwrap();
		let c = slv.new_int_var((1..=3).into()).unwrap();
		let _ = slv
			.post(linear_eq_int(
				[a * NonZeroIntVal::new(2).unwrap(), -b, c],
				3,
			))
			.unwrap();

		slv.expect_solutions(
			&[a, b, c],
			expect![[r#"
			1, 1, 2
			1, 2, 3
			2, 2, 1
			2, 3, 2"#]],
		);
	}

	#[test]
	#[traced_test]
	fn test_linear_eq_bounds() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((0..=10).into()).unwrap();
		let b = slv.new_int_var((0..=3).into()).unwrap();
		let _ = slv
			.post(linear_eq_int([a, b, IntView::from(2)], 7))
			.unwrap();
		assert_eq!(slv.get_int_bounds(a), (2, 5));

		let mark = slv.save_state();
		slv.set_int_val(b, 1).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(slv.get_int_val(a), Some(4));

		slv.restore_state(mark);
		slv.set_int_lower_bound(a, 4).unwrap();
		slv.fixpoint().unwrap();
		assert_eq!(slv.get_int_bounds(b), (0, 1));
	}

	#[test]
	#[traced_test]
	fn test_linear_eq_unsat() {
		let mut slv = Solver::default();
		let a = slv.new_int_var((1..=2).into()).unwrap();
		let b = slv.new_int_var((1..=2).into()).unwrap();
		assert_eq!(
			slv.post(linear_eq_int([a, b], 5)),
			Err(SolverError::Unsatisfiable)
		);
	}
}
