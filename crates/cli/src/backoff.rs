//! Exponential backoff for poll retries.

use std::time::Duration;

/// Delays that double per attempt up to a cap.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
	base: Duration,
	max: Duration,
	factor: u32,
	attempt: u32,
}

impl Backoff {
	pub const fn new(base: Duration, max: Duration, factor: u32) -> Self {
		Self { base, max, factor, attempt: 0 }
	}

	/// Returns the next delay and bumps the attempt counter.
	pub fn next_delay(&mut self) -> Duration {
		let multiplier = self.factor.saturating_pow(self.attempt);
		let delay = self.base.saturating_mul(multiplier).min(self.max);
		self.attempt = self.attempt.saturating_add(1);
		delay
	}

	/// Call after a successful poll.
	pub const fn reset(&mut self) {
		self.attempt = 0;
	}

	pub const fn attempt(&self) -> u32 {
		self.attempt
	}
}

impl Default for Backoff {
	/// 500ms doubling up to 30s.
	fn default() -> Self {
		Self::new(Duration::from_millis(500), Duration::from_secs(30), 2)
	}
}
