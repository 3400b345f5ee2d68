//! Propagator for the `int_eq` constraint, which enforces that two integer
//! views take the same value.

use std::cmp::{max, min};

use crate::{
	actions::{InitializationActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::{engine::activation_list::IntPropCond, view::IntView},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Domain consistent propagator for the `int_eq` constraint, `x = y`.
pub struct IntEqual {
	/// Left hand side of the equality.
	x: IntView,
	/// Right hand side of the equality.
	y: IntView,
}

impl IntEqual {
	/// Create a new [`IntEqual`] propagator enforcing `x = y`.
	pub fn new(x: IntView, y: IntView) -> Self {
		Self { x, y }
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for IntEqual {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		actions.enqueue_on_int_change(self.x, IntPropCond::Domain);
		actions.enqueue_on_int_change(self.y, IntPropCond::Domain);
		actions.enqueue_now();
		Ok(())
	}

	#[tracing::instrument(name = "int_eq", level = "trace", skip(self, actions))]
	fn propagate(&mut self, actions: &mut P) -> Result<(), Inconsistency> {
		let (x_lb, x_ub) = actions.get_int_bounds(self.x);
		let (y_lb, y_ub) = actions.get_int_bounds(self.y);
		let (lb, ub) = (max(x_lb, y_lb), min(x_ub, y_ub));
		for v in [self.x, self.y] {
			actions.set_int_lower_bound(v, lb)?;
			actions.set_int_upper_bound(v, ub)?;
		}

		// Remove the holes of each side from the other side
		for (from, other) in [(self.x, self.y), (self.y, self.x)] {
			for val in actions.get_int_values(from) {
				if !actions.check_int_in_domain(other, val) {
					actions.set_int_not_eq(from, val)?;
				}
			}
		}
		Ok(())
	}
}
