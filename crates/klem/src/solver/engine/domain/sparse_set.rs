//! Sparse set representation of integer domains.

use crate::{
	actions::TrailingActions,
	propagator::Inconsistency,
	solver::engine::{
		domain::{notify_removal, DomainListener, IntDomain},
		trail::{Trail, TrailedInt},
	},
	IntVal,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A domain that stores its values as a permutation, where the first `size`
/// entries are the members of the domain.
///
/// Removing a value swaps it behind the live prefix. Only the size and the
/// bounds are trailed, because the swaps never move a live value out of the
/// prefix, and restoring the size therefore restores the exact set of members.
pub(crate) struct SparseSetDomain {
	/// The value represented by offset `0`.
	offset: IntVal,
	/// Offsets (from [`Self::offset`]) of the values, where the first `size`
	/// entries are members of the domain.
	values: Vec<u32>,
	/// Position of each offset in [`Self::values`].
	indexes: Vec<u32>,
	/// Number of members of the domain.
	size: TrailedInt,
	/// Smallest member of the domain.
	min: TrailedInt,
	/// Largest member of the domain.
	max: TrailedInt,
}

impl SparseSetDomain {
	/// Create a new domain containing the values of the given (sorted,
	/// non-empty, and disjoint) inclusive ranges.
	pub(crate) fn new(trail: &mut Trail, ranges: &[(IntVal, IntVal)]) -> Self {
		debug_assert!(!ranges.is_empty());
		let lb = ranges[0].0;
		let ub = ranges[ranges.len() - 1].1;
		let span = (ub - lb + 1) as u32;
		let mut dom = Self {
			offset: lb,
			values: (0..span).collect(),
			indexes: (0..span).collect(),
			size: TrailedInt::new(0),
			min: TrailedInt::new(0),
			max: TrailedInt::new(0),
		};

		let mut size = span as usize;
		for (&(_, end), &(start, _)) in ranges.iter().zip(ranges.iter().skip(1)) {
			for v in end + 1..start {
				dom.swap_out(dom.offset_of(v), &mut size);
			}
		}
		dom.size = trail.track_int(size as IntVal);
		dom.min = trail.track_int(lb);
		dom.max = trail.track_int(ub);
		dom
	}

	/// Returns whether `offset` is a member of the domain when the domain has
	/// `size` members.
	fn contains_offset(&self, offset: u32, size: usize) -> bool {
		(self.indexes[offset as usize] as usize) < size
	}

	/// Returns the offset of a value within the range of the domain.
	fn offset_of(&self, val: IntVal) -> u32 {
		(val - self.offset) as u32
	}

	/// Move the member `offset` behind the live prefix of length `size`, and
	/// shrink the prefix.
	fn swap_out(&mut self, offset: u32, size: &mut usize) {
		debug_assert!(self.contains_offset(offset, *size));
		let pos = self.indexes[offset as usize] as usize;
		*size -= 1;
		self.exchange_positions(pos, *size);
	}

	/// Swap the values at two positions in the permutation.
	fn exchange_positions(&mut self, a: usize, b: usize) {
		if a == b {
			return;
		}
		let va = self.values[a];
		let vb = self.values[b];
		self.values[a] = vb;
		self.values[b] = va;
		self.indexes[va as usize] = b as u32;
		self.indexes[vb as usize] = a as u32;
	}

	/// Store a new size and bounds, and report the change to the listener.
	fn commit(
		&self,
		trail: &mut Trail,
		size: usize,
		min: IntVal,
		max: IntVal,
		listener: &mut dyn DomainListener,
	) {
		let old_min = trail.set_trailed_int(self.min, min);
		let old_max = trail.set_trailed_int(self.max, max);
		let _ = trail.set_trailed_int(self.size, size as IntVal);
		notify_removal(listener, old_min != min || old_max != max, size);
	}
}

impl IntDomain for SparseSetDomain {
	fn contains(&self, trail: &Trail, val: IntVal) -> bool {
		if val < self.lower_bound(trail) || val > self.upper_bound(trail) {
			return false;
		}
		self.contains_offset(self.offset_of(val), self.size(trail))
	}

	fn lower_bound(&self, trail: &Trail) -> IntVal {
		trail.get_trailed_int(self.min)
	}

	fn remove(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency> {
		if !self.contains(trail, val) {
			return Ok(());
		}
		let mut size = self.size(trail);
		if size == 1 {
			return Err(Inconsistency::EmptyDomain);
		}
		self.swap_out(self.offset_of(val), &mut size);

		let mut min = self.lower_bound(trail);
		let mut max = self.upper_bound(trail);
		if val == min {
			min = (val + 1..=max)
				.find(|&v| self.contains_offset(self.offset_of(v), size))
				.unwrap_or(max);
		}
		if val == max {
			max = (min..val)
				.rev()
				.find(|&v| self.contains_offset(self.offset_of(v), size))
				.unwrap_or(min);
		}
		self.commit(trail, size, min, max, listener);
		Ok(())
	}

	fn remove_above(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency> {
		let (min, max) = (self.lower_bound(trail), self.upper_bound(trail));
		if val >= max {
			return Ok(());
		}
		if val < min {
			return Err(Inconsistency::EmptyDomain);
		}
		let mut size = self.size(trail);
		let mut new_max = min;
		// Walk the live prefix backwards, so swapped in values were already seen
		for pos in (0..size).rev() {
			let v = self.values[pos] as IntVal + self.offset;
			if v > val {
				self.swap_out(self.values[pos], &mut size);
			} else {
				new_max = new_max.max(v);
			}
		}
		self.commit(trail, size, min, new_max, listener);
		Ok(())
	}

	fn remove_all_but(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency> {
		if !self.contains(trail, val) {
			return Err(Inconsistency::EmptyDomain);
		}
		if self.size(trail) == 1 {
			return Ok(());
		}
		let pos = self.indexes[self.offset_of(val) as usize] as usize;
		self.exchange_positions(pos, 0);
		self.commit(trail, 1, val, val, listener);
		Ok(())
	}

	fn remove_below(
		&mut self,
		trail: &mut Trail,
		val: IntVal,
		listener: &mut dyn DomainListener,
	) -> Result<(), Inconsistency> {
		let (min, max) = (self.lower_bound(trail), self.upper_bound(trail));
		if val <= min {
			return Ok(());
		}
		if val > max {
			return Err(Inconsistency::EmptyDomain);
		}
		let mut size = self.size(trail);
		let mut new_min = max;
		// Walk the live prefix backwards, so swapped in values were already seen
		for pos in (0..size).rev() {
			let v = self.values[pos] as IntVal + self.offset;
			if v < val {
				self.swap_out(self.values[pos], &mut size);
			} else {
				new_min = new_min.min(v);
			}
		}
		self.commit(trail, size, new_min, max, listener);
		Ok(())
	}

	fn size(&self, trail: &Trail) -> usize {
		trail.get_trailed_int(self.size) as usize
	}

	fn upper_bound(&self, trail: &Trail) -> IntVal {
		trail.get_trailed_int(self.max)
	}

	fn values(&self, trail: &Trail) -> Vec<IntVal> {
		let mut values: Vec<IntVal> = self.values[..self.size(trail)]
			.iter()
			.map(|&o| o as IntVal + self.offset)
			.collect();
		values.sort_unstable();
		values
	}
}
