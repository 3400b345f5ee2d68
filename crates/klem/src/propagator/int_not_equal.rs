//! Propagator for the `int_ne` constraint, which enforces that two integer
//! views take different values.

use crate::{
	actions::{InitializationActions, InspectionActions, PropagationActions},
	propagator::{Inconsistency, Propagator},
	solver::view::IntView,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Value consistent propagator for the `int_ne` constraint, `x ≠ y`.
///
/// An offset can be expressed using a view, e.g. `x ≠ y + c` is
/// `IntNotEqual::new(x, y + c)`.
///
/// The propagator is never scheduled itself. Once either side is fixed, its
/// value is removed from the other side by a reaction.
pub struct IntNotEqual {
	/// Left hand side of the disequality.
	x: IntView,
	/// Right hand side of the disequality.
	y: IntView,
}

impl IntNotEqual {
	/// Create a new [`IntNotEqual`] propagator enforcing `x ≠ y`.
	pub fn new(x: IntView, y: IntView) -> Self {
		Self { x, y }
	}
}

impl<I: InitializationActions, P: PropagationActions> Propagator<I, P> for IntNotEqual {
	fn setup(&mut self, actions: &mut I) -> Result<(), Inconsistency> {
		let (x, y) = (self.x, self.y);
		if let Some(val) = actions.get_int_val(y) {
			actions.set_int_not_eq(x, val)?;
		} else if let Some(val) = actions.get_int_val(x) {
			actions.set_int_not_eq(y, val)?;
		}
		actions.when_fixed(x, move |ctx| match ctx.get_int_val(x) {
			Some(val) => ctx.set_int_not_eq(y, val),
			None => Ok(()),
		});
		actions.when_fixed(y, move |ctx| match ctx.get_int_val(y) {
			Some(val) => ctx.set_int_not_eq(x, val),
			None => Ok(()),
		});
		Ok(())
	}
}
