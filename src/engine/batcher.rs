use glam::DVec2;
use std::time::{Duration, Instant};

/// Coalesces discrete steps that arrive in quick succession into a single displacement.
///
/// There is no timer. Whether a step flushes is decided when the step arrives: the first step
/// ever, and any step arriving more than `batch_time` after the previous flush, flushes everything
/// pending including itself. Steps arriving inside the window stay buffered until such a step
/// comes along, possibly forever.
#[derive(Debug, Clone)]
pub struct MoveBatcher {
	batch_time: Duration,
	pending: Vec<DVec2>,
	last_flush: Option<Instant>,
}

impl MoveBatcher {
	pub fn new(batch_time: Duration) -> Self {
		Self {
			batch_time,
			pending: Vec::new(),
			last_flush: None,
		}
	}

	/// Records a step taken at `now`. Returns the net displacement if this step flushed the window.
	pub fn record_step(&mut self, step: DVec2, now: Instant) -> Option<DVec2> {
		self.pending.push(step);

		let elapsed = match self.last_flush {
			None => true,
			Some(last) => now.saturating_duration_since(last) > self.batch_time,
		};
		if !elapsed {
			tracing::trace!(pending = self.pending.len(), "step buffered");
			return None;
		}

		Some(self.flush(now))
	}

	fn flush(&mut self, now: Instant) -> DVec2 {
		let count = self.pending.len();
		let sum = self.pending.drain(..).fold(DVec2::ZERO, |sum, step| sum + step);
		self.last_flush = Some(now);
		tracing::debug!(steps = count, dx = sum.x, dy = sum.y, "flushing coalesced moves");
		sum
	}

	/// Net displacement of the steps still waiting for a flush.
	pub fn pending(&self) -> DVec2 {
		self.pending.iter().copied().sum()
	}

	#[cfg(test)]
	fn pending_len(&self) -> usize {
		self.pending.len()
	}
}
