//! Bit set representation of integer domains.

use crate::{
	actions::TrailingActions,
	propagator::Inconsistency,
	solver::engine::{
		domain::{notify_removal, DomainListener, IntDomain},
		trail::{Trail, TrailedInt},
	},
	IntVal,
};

/// Number of values stored in each word of a [`BitSetDomain`].
const WORD_BITS: u64 = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A domain that stores membership as one bit per value, with every word of
/// bits being trailed.
///
/// Bits outside of the current bounds are always cleared.
pub(crate) struct BitSetDomain {
	/// The value represented by the first bit.
	offset: IntVal,
	/// The words of the bit set, each storing 64 bits as a trailed integer.
	words: Vec<TrailedInt>,
	/// Number of members of the domain.
	size: TrailedInt,
	/// Smallest member of the domain.
	min: TrailedInt,
	/// Largest member of the domain.
	max: TrailedInt,
}

/// Mask selecting the bits `lo..hi` of a word.
fn range_mask(lo: u64, hi: u64) -> u64 {
	debug_assert!(lo < hi && hi <= WORD_BITS);
	if hi - lo == WORD_BITS {
		u64::MAX
	} else {
		((1 << (hi - lo)) - 1) << lo
	}
}

impl BitSetDomain {
	/// Create a new domain containing the values of the given (sorted,
	/// non-empty, and disjoint) inclusive ranges.
	pub(crate) fn new(trail: &mut Trail, ranges: &[(IntVal, IntVal)]) -> Self {
		debug_assert!(!ranges.is_empty());
		let lb = ranges[0].0;
		let ub = ranges[ranges.len() - 1].1;
		let span = (ub - lb + 1) as u64;
		let mut bits = vec![0_u64; span.div_ceil(WORD_BITS) as usize];
		let mut size = 0;
		for &(start, end) in ranges {
			for v in start..=end {
				let o = (v - lb) as u64;
				bits[(o / WORD_BITS) as usize] |= 1 << (o % WORD_BITS);
			}
			size += end - start + 1;
		}
		Self {
			offset: lb,
			words: bits
				.into_iter()
				.map(|w| trail.track_int(w as IntVal))
				.collect(),
			size: trail.track_int(size),
			min: trail.track_int(lb),
			max: trail.track_int(ub),
		}
	}

	/// Clear the bits for the offsets `lo..hi`, returning the number of members
	/// that were removed.
	fn clear_range(&self, trail: &mut Trail, lo: u64, hi: u64) -> usize {
		if lo >= hi {
			return 0;
		}
		let mut removed = 0;
		for w in lo / WORD_BITS..=(hi - 1) / WORD_BITS {
			let start = if w == lo / WORD_BITS { lo % WORD_BITS } else { 0 };
			let end = if w == (hi - 1) / WORD_BITS {
				(hi - 1) % WORD_BITS + 1
			} else {
				WORD_BITS
			};
			let mask = range_mask(start, end);
			let word = self.word(trail, w);
			if word & mask != 0 {
				removed += (word & mask).count_ones() as usize;
				let _ = trail.set_trailed_int(self.words[w as usize], (word & !mask) as IntVal);
			}
		}
		removed
	}

	/// Returns the smallest member offset that is at least `from`.
	fn next_member(&self, trail: &Trail, from: u64) -> Option<u64> {
		let first = from / WORD_BITS;
		for w in first..self.words.len() as u64 {
			let mut word = self.word(trail, w);
			if w == first {
				word &= u64::MAX << (from % WORD_BITS);
			}
			if word != 0 {
				return Some(w * WORD_BITS + word.trailing_zeros() as u64);
			}
		}
		None
	}

	/// Returns the offset of a value.
	fn offset_of(&self, val: IntVal) -> u64 {
		(val - self.offset) as u64
	}

	/// Returns the largest member offset that is at most `from`.
	fn prev_member(&self, trail: &Trail, from: u64) -> Option<u64> {
		let last = from / WORD_BITS;
		for w in (0..=last).rev() {
			let mut word = self.word(trail, w);
			if w == last {
				word &= range_mask(0, from % WORD_BITS + 1);
			}
			if word != 0 {
				return Some(w * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as u64));
			}
		}
		None
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

	/// Read the bits of word `w`.
	fn word(&self, trail: &Trail, w: u64) -> u64 {
		trail.get_trailed_int(self.words[w as usize]) as u64
	}
}

impl IntDomain for BitSetDomain {
	fn contains(&self, trail: &Trail, val: IntVal) -> bool {
		if val < self.lower_bound(trail) || val > self.upper_bound(trail) {
			return false;
		}
		let o = self.offset_of(val);
		self.word(trail, o / WORD_BITS) & (1 << (o % WORD_BITS)) != 0
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
		let size = self.size(trail);
		if size == 1 {
			return Err(Inconsistency::EmptyDomain);
		}
		let o = self.offset_of(val);
		let removed = self.clear_range(trail, o, o + 1);
		debug_assert_eq!(removed, 1);

		let mut min = self.lower_bound(trail);
		let mut max = self.upper_bound(trail);
		if val == min {
			min = self
				.next_member(trail, o)
				.map_or(max, |m| m as IntVal + self.offset);
		}
		if val == max {
			max = self
				.prev_member(trail, o)
				.map_or(min, |m| m as IntVal + self.offset);
		}
		self.commit(trail, size - 1, min, max, listener);
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
		let o = self.offset_of(val);
		let removed = self.clear_range(trail, o + 1, self.offset_of(max) + 1);
		let new_max = self
			.prev_member(trail, o)
			.map_or(min, |m| m as IntVal + self.offset);
		let size = self.size(trail) - removed;
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
		let o = self.offset_of(val);
		let lo = self.offset_of(self.lower_bound(trail));
		let hi = self.offset_of(self.upper_bound(trail));
		let _ = self.clear_range(trail, lo, o);
		let _ = self.clear_range(trail, o + 1, hi + 1);
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
		let o = self.offset_of(val);
		let removed = self.clear_range(trail, self.offset_of(min), o);
		let new_min = self
			.next_member(trail, o)
			.map_or(max, |m| m as IntVal + self.offset);
		let size = self.size(trail) - removed;
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
		let mut values = Vec::with_capacity(self.size(trail));
		let mut next = self.next_member(trail, self.offset_of(self.lower_bound(trail)));
		while let Some(o) = next {
			values.push(o as IntVal + self.offset);
			next = self.next_member(trail, o + 1);
		}
		values
	}
}
