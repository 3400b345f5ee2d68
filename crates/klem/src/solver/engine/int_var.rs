//! Module containing the representation of integer variables within the
//! [`crate::solver::engine::Engine`].

use std::ops::Not;

use delegate::delegate;

use crate::{
	propagator::Inconsistency,
	solver::engine::{
		domain::{bit_set::BitSetDomain, sparse_set::SparseSetDomain, DomainListener, IntDomain},
		trail::Trail,
	},
	IntVal,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// The data structure used to store the domain of an integer variable.
pub enum DomainRepresentation {
	#[default]
	/// Store the values as a sparse set, trailing only its size and bounds.
	SparseSet,
	/// Store the values as a bit set, trailing every word of the set that
	/// changes.
	BitSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// A condition on the value of an integer variable `x`.
pub enum IntCondition {
	/// The condition `x = i`.
	Eq(IntVal),
	/// The condition `x ≠ i`.
	NotEq(IntVal),
	/// The condition `x ≥ i`.
	GreaterEq(IntVal),
	/// The condition `x < i`.
	Less(IntVal),
}

#[derive(Debug)]
/// The representation of an integer variable in the engine.
///
/// The variable owns its domain, but the state of the domain lives on the
/// [`Trail`].
pub(crate) struct IntVar {
	/// The storage of the current domain of the variable.
	domain: Box<dyn IntDomain>,
}

impl IntCondition {
	/// Returns the condition `x ≤ val`, or `None` if every value satisfies it.
	pub(crate) fn at_most(val: IntVal) -> Option<Self> {
		val.checked_add(1).map(IntCondition::Less)
	}

	/// Returns whether the condition holds for the value `val`.
	pub fn holds(&self, val: IntVal) -> bool {
		match *self {
			IntCondition::Eq(i) => val == i,
			IntCondition::NotEq(i) => val != i,
			IntCondition::GreaterEq(i) => val >= i,
			IntCondition::Less(i) => val < i,
		}
	}
}

impl Not for IntCondition {
	type Output = IntCondition;

	fn not(self) -> Self::Output {
		match self {
			IntCondition::Eq(i) => IntCondition::NotEq(i),
			IntCondition::NotEq(i) => IntCondition::Eq(i),
			IntCondition::GreaterEq(i) => IntCondition::Less(i),
			IntCondition::Less(i) => IntCondition::GreaterEq(i),
		}
	}
}

impl IntVar {
	/// Enforce `condition` on the variable, reporting any resulting events to
	/// `listener`.
	///
	/// An [`Inconsistency`] is returned, without making any changes, if the
	/// condition does not hold for any value in the domain.
	pub(crate) fn apply(
		&mut self,
		trail: &mut Trail,
		condition: IntCondition,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency> {
		match condition {
			IntCondition::Eq(v) => self.domain.remove_all_but(trail, v, listener),
			IntCondition::NotEq(v) => self.domain.remove(trail, v, listener),
			IntCondition::GreaterEq(v) => self.domain.remove_below(trail, v, listener),
			IntCondition::Less(v) => match v.checked_sub(1) {
				Some(v) => self.domain.remove_above(trail, v, listener),
				None => Err(Inconsistency::EmptyDomain),
			},
		}
	}

	delegate! {
		to self.domain {
			pub(crate) fn contains(&self, trail: &Trail, val: IntVal) -> bool;
			pub(crate) fn lower_bound(&self, trail: &Trail) -> IntVal;
			pub(crate) fn size(&self, trail: &Trail) -> usize;
			pub(crate) fn upper_bound(&self, trail: &Trail) -> IntVal;
			pub(crate) fn values(&self, trail: &Trail) -> Vec<IntVal>;
		}
	}

	/// Create a new integer variable with a domain containing the values of the
	/// given (sorted, non-empty, and disjoint) inclusive ranges.
	pub(crate) fn new(
		trail: &mut Trail,
		ranges: &[(IntVal, IntVal)],
		representation: DomainRepresentation,
	) -> Self {
		let domain: Box<dyn IntDomain> = match representation {
			DomainRepresentation::SparseSet => Box::new(SparseSetDomain::new(trail, ranges)),
			DomainRepresentation::BitSet => Box::new(BitSetDomain::new(trail, ranges)),
		};
		Self { domain }
	}
}

index_vec::define_index_type! {
	/// Identifies an integer variable in a [`crate::Solver`]
	pub struct IntVarRef = u32;
}

#[cfg(test)]
mod tests {
	use crate::{
		propagator::Inconsistency,
		solver::engine::{
			domain::DomainListener,
			int_var::{DomainRepresentation, IntCondition, IntVar},
			trail::Trail,
		},
		IntVal,
	};

	/// Listener that records the order in which events are received.
	#[derive(Debug, Default)]
	struct EventLog(Vec<&'static str>);

	impl DomainListener for EventLog {
		fn bind(&mut self) {
			self.0.push("bind");
		}
		fn change_bounds(&mut self) {
			self.0.push("bounds");
		}
		fn change(&mut self) {
			self.0.push("change");
		}
	}

	#[test]
	fn test_apply_condition() {
		for repr in [DomainRepresentation::SparseSet, DomainRepresentation::BitSet] {
			let mut trail = Trail::default();
			let mut var = IntVar::new(&mut trail, &[(1, 5)], repr);
			let mut log = EventLog::default();

			var.apply(&mut trail, IntCondition::Less(5), &mut log)
				.unwrap();
			assert_eq!(var.upper_bound(&trail), 4);
			var.apply(&mut trail, IntCondition::GreaterEq(2), &mut log)
				.unwrap();
			assert_eq!(var.lower_bound(&trail), 2);
			var.apply(&mut trail, IntCondition::NotEq(3), &mut log)
				.unwrap();
			assert_eq!(var.values(&trail), vec![2, 4]);
			var.apply(&mut trail, IntCondition::Eq(4), &mut log)
				.unwrap();
			assert_eq!(var.values(&trail), vec![4]);
			assert!(var
				.apply(&mut trail, IntCondition::GreaterEq(5), &mut log)
				.is_err());
			assert_eq!(var.size(&trail), 1);

			assert_eq!(
				log.0,
				vec!["change", "bounds", "change", "bounds", "change", "change", "bounds", "bind"]
			);
		}
	}

	#[test]
	fn test_extreme_bounds() {
		for repr in [DomainRepresentation::SparseSet, DomainRepresentation::BitSet] {
			let mut trail = Trail::default();
			let mut var = IntVar::new(&mut trail, &[(-3, 3)], repr);
			let mut log = EventLog::default();

			assert_eq!(IntCondition::at_most(IntVal::MAX), None);
			assert_eq!(IntCondition::at_most(3), Some(IntCondition::Less(4)));
			var.apply(&mut trail, IntCondition::GreaterEq(IntVal::MIN), &mut log)
				.unwrap();
			assert_eq!(
				var.apply(&mut trail, IntCondition::Less(IntVal::MIN), &mut log),
				Err(Inconsistency::EmptyDomain)
			);
			assert_eq!(var.size(&trail), 7);
			assert!(log.0.is_empty());
		}
	}

	#[test]
	fn test_condition_negation() {
		for cond in [
			IntCondition::Eq(2),
			IntCondition::NotEq(2),
			IntCondition::GreaterEq(2),
			IntCondition::Less(2),
		] {
			for v in 0..4 {
				assert_ne!(cond.holds(v), (!cond).holds(v));
			}
		}
	}
}
