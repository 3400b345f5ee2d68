//! Propagator for the `int_abs` constraint, which enforces that an integer view
//! is the absolute value of another integer view.

use std::cmp::max;

use crate::{
	actions::{InitializationActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::{engine::activation_list::IntPropCond, view::IntView},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Bounds propagator for the `int_abs` constraint, `y = |x|`.
///
/// Once either side is fixed, the other side is made value consistent.
pub struct IntAbs {
	/// The view whose absolute value is taken.
	x: IntView,
	/// The absolute value of `x`.
	y: IntView,
}

impl IntAbs {
	/// Create a new [`IntAbs`] propagator enforcing `y = |x|`.
	pub fn new(x: IntView, y: IntView) -> Self {
		Self { x, y }
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for IntAbs {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		actions.set_int_lower_bound(self.y, 0)?;
		actions.enqueue_on_int_change(self.x, IntPropCond::Bounds);
		actions.enqueue_on_int_change(self.y, IntPropCond::Bounds);
		actions.enqueue_now();
		Ok(())
	}

	#[tracing::instrument(name = "int_abs", level = "trace", skip(self, actions))]
	fn propagate(&mut self, actions: &mut P) -> Result<(), Inconsistency> {
		let (x, y) = (self.x, self.y);
		if let Some(val) = actions.get_int_val(x) {
			actions.set_int_val(y, val.abs())?;
			actions.deactivate();
			return Ok(());
		}
		if let Some(val) = actions.get_int_val(y) {
			if !actions.check_int_in_domain(x, -val) {
				actions.set_int_val(x, val)?;
			} else if !actions.check_int_in_domain(x, val) {
				actions.set_int_val(x, -val)?;
			} else {
				for v in actions.get_int_values(x) {
					if v != val && v != -val {
						actions.set_int_not_eq(x, v)?;
					}
				}
			}
			actions.deactivate();
			return Ok(());
		}

		let (x_lb, x_ub) = actions.get_int_bounds(x);
		if x_lb >= 0 {
			actions.set_int_lower_bound(y, x_lb)?;
			actions.set_int_upper_bound(y, x_ub)?;
			let (y_lb, y_ub) = actions.get_int_bounds(y);
			actions.set_int_lower_bound(x, y_lb)?;
			actions.set_int_upper_bound(x, y_ub)?;
		} else if x_ub <= 0 {
			actions.set_int_lower_bound(y, -x_ub)?;
			actions.set_int_upper_bound(y, -x_lb)?;
			let (y_lb, y_ub) = actions.get_int_bounds(y);
			actions.set_int_lower_bound(x, -y_ub)?;
			actions.set_int_upper_bound(x, -y_lb)?;
		} else {
			actions.set_int_upper_bound(y, max(x_ub, -x_lb))?;
			let y_ub = actions.get_int_upper_bound(y);
			actions.set_int_lower_bound(x, -y_ub)?;
			actions.set_int_upper_bound(x, y_ub)?;
			// Smallest absolute value supported by x
			loop {
				let y_lb = actions.get_int_lower_bound(y);
				if actions.check_int_in_domain(x, y_lb) || actions.check_int_in_domain(x, -y_lb) {
					break;
				}
				actions.set_int_not_eq(y, y_lb)?;
			}
		}
		Ok(())
	}
}
