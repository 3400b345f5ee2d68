//! The representation of the domains of integer variables.
//!
//! A domain is a finite set of integer values that can only shrink during the
//! search. Every change is recorded on the [`Trail`], so restoring the trail
//! restores the exact set of values. Effective changes are reported to a
//! [`DomainListener`], while removing the last value is reported as an
//! [`Inconsistency`] without changing the domain.

pub(crate) mod bit_set;
pub(crate) mod sparse_set;

use std::fmt::Debug;

use crate::{propagator::Inconsistency, solver::engine::trail::Trail, IntVal};

/// Receiver of the events caused by the effective removal of values from a
/// domain.
///
/// For a single mutation, [`Self::change`] is always called, followed by
/// [`Self::change_bounds`] if the lower or upper bound moved, and
/// [`Self::bind`] if a single value remains.
pub(crate) trait DomainListener {
	/// The domain was reduced to a single value.
	fn bind(&mut self);
	/// The lower bound or the upper bound of the domain changed.
	fn change_bounds(&mut self);
	/// One or more values were removed from the domain.
	fn change(&mut self);
}

/// Interface of a trailed integer domain.
pub(crate) trait IntDomain: Debug {
	/// Returns whether `val` is a member of the domain.
	fn contains(&self, trail: &Trail, val: IntVal) -> bool;
	/// Returns the smallest value in the domain.
	fn lower_bound(&self, trail: &Trail) -> IntVal;
	/// Remove `val` from the domain.
	fn remove(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency>;
	/// Remove all values larger than `val` from the domain.
	fn remove_above(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency>;
	/// Remove all values except `val` from the domain.
	fn remove_all_but(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency>;
	/// Remove all values smaller than `val` from the domain.
	fn remove_below(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency>;
	/// Returns the number of values in the domain.
	fn size(&self, trail: &Trail) -> usize;
	/// Returns the largest value in the domain.
	fn upper_bound(&self, trail: &Trail) -> IntVal;
	/// Returns the values in the domain in increasing order.
	fn values(&self, trail: &Trail) -> Vec<IntVal>;
}

/// Report an effective removal to `listener`.
fn notify_removal(listener: &mut dyn DomainListener, bounds_changed: bool, size: usize) {
	debug_assert!(size >= 1);
	listener.change();
	if bounds_changed {
		listener.change_bounds();
	}
	if size == 1 {
		listener.bind();
	}
}
