use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the timestamps used to decide when pending moves are flushed.
pub trait Clock {
	fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// A clock that only moves when told to. Clones share the same time, so a session can be replayed
/// deterministically from a script of (event, timestamp) pairs.
#[derive(Debug, Clone)]
pub struct ManualClock(Rc<Cell<Instant>>);

impl ManualClock {
	pub fn new() -> Self {
		Self::starting_at(Instant::now())
	}

	pub fn starting_at(start: Instant) -> Self {
		Self(Rc::new(Cell::new(start)))
	}

	pub fn advance(&self, by: Duration) {
		self.0.set(self.0.get() + by);
	}

	pub fn advance_millis(&self, millis: u64) {
		self.advance(Duration::from_millis(millis));
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.0.get()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_clones_share_time() {
		let clock = ManualClock::new();
		let start = clock.now();
		let other = clock.clone();
		other.advance_millis(7);
		assert_eq!(clock.now() - start, Duration::from_millis(7));
	}
}
