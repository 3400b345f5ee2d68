//! This module contains the data structures used to trail values during the
//! search process. Changes made to trailed values are recorded in the central
//! [`Trail`] structure. When the search process needs to backtrack, the
//! recorded changes are undone in reverse order until the trail is back at a
//! [`TrailMark`] taken earlier.

use std::mem;

use index_vec::IndexVec;
use tracing::trace;

use crate::{actions::TrailingActions, IntVal};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The central store of reversible values, and the log of the changes made to
/// them.
pub(crate) struct Trail {
	/// The storage of events that have been trailed.
	///
	/// Note that the trail contains a sequence of integers, but 1 or 3 of these
	/// integers are intended to be read as a [`TrailEvent`].
	trail: Vec<u32>,
	/// Stores the current value of trailed integer values.
	int_value: IndexVec<TrailedInt, IntVal>,
	/// Stores the current value of trailed Boolean values.
	bool_value: IndexVec<TrailedBool, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An event that is recorded such that it can be undone.
pub(crate) enum TrailEvent {
	/// The assignment of a trailed integer value, and the previous value it had.
	IntAssignment(TrailedInt, IntVal),
	/// The assignment of a trailed Boolean value, and the previous value it had.
	BoolAssignment(TrailedBool, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// An opaque position in the trail, created by saving the state of the
/// solver, to which the solver can later be restored.
pub struct TrailMark {
	/// Length of the trail when the mark was taken.
	pub(crate) pos: usize,
	/// Whether the solver was in a failed state when the mark was taken.
	pub(crate) failed: bool,
}

impl Trail {
	/// Return the number of integers currently used to store trailed events.
	pub(crate) fn len(&self) -> usize {
		self.trail.len()
	}

	/// Record the current position of the trail.
	pub(crate) fn mark(&self) -> TrailMark {
		TrailMark {
			pos: self.trail.len(),
			failed: false,
		}
	}

	/// Internal method to push a change to the trail
	fn push_trail(&mut self, event: TrailEvent) {
		let pos = self.trail.len();
		match event {
			TrailEvent::BoolAssignment(_, _) => self.trail.push(0),
			TrailEvent::IntAssignment(_, _) => self.trail.extend([0; 3]),
		}
		event.write_trail(&mut self.trail[pos..]);
	}

	/// Undo all changes made since `mark` was taken, in reverse order.
	///
	/// Nothing happens when the trail is already at or before `mark`.
	pub(crate) fn restore(&mut self, mark: TrailMark) {
		if self.trail.len() <= mark.pos {
			return;
		}
		trace!(from = self.trail.len(), to = mark.pos, "restore trail");
		while self.trail.len() > mark.pos {
			let _ = self.undo();
		}
		debug_assert_eq!(
			self.trail.len(),
			mark.pos,
			"restoring to a mark that is not an event boundary"
		);
	}

	/// Create a new trailed Boolean with initial value `val`
	pub(crate) fn track_bool(&mut self, val: bool) -> TrailedBool {
		debug_assert!(self.bool_value.len() < (1 << 30) - 1);
		self.bool_value.push(val)
	}

	/// Create a new trailed integer with initial value `val`
	pub(crate) fn track_int(&mut self, val: IntVal) -> TrailedInt {
		self.int_value.push(val)
	}

	/// Internal method to undo the last change on the trail.
	///
	/// Note that his method will return `None` if the trail is empty.
	fn undo(&mut self) -> Option<TrailEvent> {
		let &last = self.trail.last()?;
		// Find event before current position
		let event = if (last as i32).is_positive() {
			let _ = self.trail.pop();
			TrailEvent::bool_from_raw(last)
		} else {
			let pos = self.trail.len() - 3;
			let event = TrailEvent::int_from_trail([
				self.trail[pos],
				self.trail[pos + 1],
				self.trail[pos + 2],
			]);
			self.trail.truncate(pos);
			event
		};

		match event {
			TrailEvent::IntAssignment(i, v) => self.int_value[i] = v,
			TrailEvent::BoolAssignment(b, v) => self.bool_value[b] = v,
		}
		Some(event)
	}
}

impl Default for Trail {
	fn default() -> Self {
		Self {
			trail: Vec::new(),
			int_value: IndexVec::new(),
			bool_value: IndexVec::new(),
		}
	}
}

impl TrailingActions for Trail {
	fn get_trailed_bool(&self, b: TrailedBool) -> bool {
		self.bool_value[b]
	}
	fn get_trailed_int(&self, i: TrailedInt) -> IntVal {
		self.int_value[i]
	}
	fn set_trailed_bool(&mut self, b: TrailedBool, v: bool) -> bool {
		if self.bool_value[b] == v {
			return v;
		}
		let old = mem::replace(&mut self.bool_value[b], v);
		self.push_trail(TrailEvent::BoolAssignment(b, old));
		old
	}
	fn set_trailed_int(&mut self, i: TrailedInt, v: IntVal) -> IntVal {
		if self.int_value[i] == v {
			return v;
		}
		let old = mem::replace(&mut self.int_value[i], v);
		self.push_trail(TrailEvent::IntAssignment(i, old));
		old
	}
}

impl TrailEvent {
	#[inline]
	/// Internal method used to recover a [`TrailEvent::BoolAssignment`] from
	/// the single (positive) integer it is stored as.
	fn bool_from_raw(raw: u32) -> Self {
		let raw = raw - 1;
		TrailEvent::BoolAssignment(((raw >> 1) as usize).into(), raw & 1 == 1)
	}

	#[inline]
	/// Internal method used to tranform a slice of the trail to a
	/// [`TrailEvent::IntAssignment`] object for the [`Trail::undo`] method.
	fn int_from_trail(raw: [u32; 3]) -> Self {
		let i = -(raw[2] as i32) as usize;
		let high = raw[1] as u64;
		let low = raw[0] as u64;
		TrailEvent::IntAssignment(i.into(), ((high << 32) | low) as i64)
	}

	#[inline]
	/// Internal method to write a [`TrailEvent`] to the slice `trail` using an
	/// efficient format.
	///
	/// Boolean events take a single positive integer, integer events take three
	/// integers of which the last is never positive.
	fn write_trail(&self, trail: &mut [u32]) {
		match self {
			TrailEvent::BoolAssignment(b, val) => {
				trail[0] = (((b.index() as u32) << 1) | *val as u32) + 1;
			}
			TrailEvent::IntAssignment(i, val) => {
				let val = *val as u64;
				let high = (val >> 32) as u32;
				let low = val as u32;
				trail[0] = low;
				trail[1] = high;
				trail[2] = -(usize::from(*i) as i32) as u32;
			}
		}
	}
}

index_vec::define_index_type! {
	/// Identifies a trailed Boolean tracked within the [`crate::Solver`]
	pub struct TrailedBool = u32;
}

index_vec::define_index_type! {
	/// Identifies a trailed integer tracked within the [`crate::Solver`]
	pub struct TrailedInt = u32;
}

#[cfg(test)]
mod tests {
	use crate::{
		actions::TrailingActions,
		solver::engine::trail::{Trail, TrailEvent},
		IntVal,
	};

	#[test]
	fn test_trail_event() {
		let mut trail = Trail::default();
		let int_events: Vec<_> = [
			IntVal::MAX,
			IntVal::MIN,
			0,
			1,
			-1,
			2_i64.pow(32),
			-(2_i64.pow(32)),
		]
		.into_iter()
		.map(|v| (trail.track_int(v), v))
		.collect();
		let flags: Vec<_> = (0..4).map(|i| (trail.track_bool(i % 2 == 0), i % 2 == 0)).collect();

		let mark = trail.mark();
		for &(i, v) in &int_events {
			assert_eq!(trail.set_trailed_int(i, v / 2 + 7), v);
		}
		for &(b, v) in &flags {
			assert_eq!(trail.set_trailed_bool(b, !v), v);
		}

		for &(b, v) in flags.iter().rev() {
			assert_eq!(trail.undo(), Some(TrailEvent::BoolAssignment(b, v)));
			assert_eq!(trail.get_trailed_bool(b), v);
		}
		for &(i, v) in int_events.iter().rev() {
			assert_eq!(trail.undo(), Some(TrailEvent::IntAssignment(i, v)));
			assert_eq!(trail.get_trailed_int(i), v);
		}
		assert_eq!(trail.mark(), mark);
		assert_eq!(trail.undo(), None);
	}

	#[test]
	fn test_restore_is_exact() {
		let mut trail = Trail::default();
		let x = trail.track_int(10);
		let y = trail.track_int(20);
		let b = trail.track_bool(true);

		let _ = trail.set_trailed_int(x, 11);
		let m0 = trail.mark();
		let _ = trail.set_trailed_int(x, 12);
		let _ = trail.set_trailed_int(y, 21);
		let _ = trail.set_trailed_int(x, 13);
		let m1 = trail.mark();
		let _ = trail.set_trailed_bool(b, false);
		let _ = trail.set_trailed_int(y, 22);

		trail.restore(m1);
		assert_eq!(trail.get_trailed_int(x), 13);
		assert_eq!(trail.get_trailed_int(y), 21);
		assert!(trail.get_trailed_bool(b));

		trail.restore(m0);
		assert_eq!(trail.get_trailed_int(x), 11);
		assert_eq!(trail.get_trailed_int(y), 20);
		assert_eq!(trail.mark(), m0);

		// Restoring to a later (stale) mark does nothing
		trail.restore(m1);
		assert_eq!(trail.get_trailed_int(x), 11);
		assert_eq!(trail.mark(), m0);
	}

	#[test]
	fn test_unchanged_value_is_not_trailed() {
		let mut trail = Trail::default();
		let x = trail.track_int(5);
		let b = trail.track_bool(false);
		let len = trail.len();
		assert_eq!(trail.set_trailed_int(x, 5), 5);
		assert!(!trail.set_trailed_bool(b, false));
		assert_eq!(trail.len(), len);
	}
}
