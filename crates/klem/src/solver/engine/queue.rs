//! This module contains the defitions for the priority queue used by the
//! [`crate::solver::engine::Engine`] to schedule propagators.

use std::collections::VecDeque;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
/// The priority levels at which propagators can be scheduled.
pub enum PriorityLevel {
	/// The lowest priority level, all other priority levels are more important
	Lowest,
	/// A low level of priority, all apart from one priority level are more
	/// important
	Low,
	#[default]
	/// A medium level of priority, there are just as many normal priority levels
	/// more as less important than this one.
	Medium,
	/// A high level of priority, all apart from one normal priority level are
	/// less important.
	High,
	/// The highest normal priority level, this priority level is the most
	/// important normal level of priority.
	Highest,
	/// An extraordinarily high level of priority, used for reactions that must
	/// run before any other scheduled work.
	Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A priority queue for propagators.
///
/// Elements of the same priority level are returned in the order in which they
/// were inserted.
pub(crate) struct PriorityQueue<E> {
	/// Internal storage of the queues for each priority level.
	storage: [VecDeque<E>; 6],
}

impl<E> PriorityQueue<E> {
	/// Inserts a propagator into the queue at the end of the given priority
	/// level.
	pub(crate) fn insert(&mut self, priority: PriorityLevel, elem: E) {
		let i = priority as usize;
		debug_assert!((0..=5).contains(&i));
		self.storage[i].push_back(elem);
	}

	/// Returns whether no propagators are currently waiting in the queue.
	pub(crate) fn is_empty(&self) -> bool {
		self.storage.iter().all(VecDeque::is_empty)
	}

	/// Pops the oldest propagator of the highest priority level from the queue.
	pub(crate) fn pop(&mut self) -> Option<E> {
		self.storage
			.iter_mut()
			.rev()
			.find(|queue| !queue.is_empty())
			.and_then(VecDeque::pop_front)
	}
}

impl<E> Default for PriorityQueue<E> {
	fn default() -> Self {
		Self {
			storage: Default::default(),
		}
	}
}
