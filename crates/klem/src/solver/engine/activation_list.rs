//! Storage of the propagators that must be scheduled when the domain of an
//! integer variable changes.

use crate::solver::engine::PropRef;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The propagators registered on a single integer variable, grouped by the
/// kind of change that activates them.
///
/// Registrations are never removed, and survive backtracking.
pub(crate) struct ActivationList {
	/// Propagators activated when the variable becomes fixed.
	fixed: Vec<PropRef>,
	/// Propagators activated when the lower or upper bound changes.
	bounds: Vec<PropRef>,
	/// Propagators activated by any removal of a value.
	domain: Vec<PropRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The condition on an integer variable under which a propagator (or reaction)
/// is scheduled.
pub enum IntPropCond {
	/// Schedule when the variable becomes fixed to a single value.
	Fixed,
	/// Schedule when the lower bound or the upper bound of the variable changes.
	Bounds,
	/// Schedule whenever any value is removed from the domain of the variable.
	Domain,
}

impl ActivationList {
	/// Register `prop` to be activated under the given condition.
	pub(crate) fn add(&mut self, prop: PropRef, condition: IntPropCond) {
		let list = match condition {
			IntPropCond::Fixed => &mut self.fixed,
			IntPropCond::Bounds => &mut self.bounds,
			IntPropCond::Domain => &mut self.domain,
		};
		list.push(prop);
	}

	/// Returns the propagators that are activated under the given condition, in
	/// the order in which they were registered.
	pub(crate) fn activated_by(&self, condition: IntPropCond) -> &[PropRef] {
		match condition {
			IntPropCond::Fixed => &self.fixed,
			IntPropCond::Bounds => &self.bounds,
			IntPropCond::Domain => &self.domain,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::solver::engine::{
		activation_list::{ActivationList, IntPropCond},
		PropRef,
	};

	#[test]
	fn test_activation_list() {
		let mut list = ActivationList::default();
		list.add(PropRef::new(0), IntPropCond::Domain);
		list.add(PropRef::new(1), IntPropCond::Fixed);
		list.add(PropRef::new(2), IntPropCond::Bounds);
		list.add(PropRef::new(3), IntPropCond::Fixed);

		assert_eq!(
			list.activated_by(IntPropCond::Fixed),
			&[PropRef::new(1), PropRef::new(3)]
		);
		assert_eq!(list.activated_by(IntPropCond::Bounds), &[PropRef::new(2)]);
		assert_eq!(list.activated_by(IntPropCond::Domain), &[PropRef::new(0)]);
	}
}
