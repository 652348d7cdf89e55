use std::time::{Duration, Instant};

/// Default quiet period before a debounced value is released.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Holds the latest requested value until it has been quiet for `delay`.
///
/// Time is passed in explicitly so callers drive it from their own frame or
/// event loop clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
	delay: Duration,
	pending: Option<T>,
	pending_since: Option<Instant>,
}

impl<T> Default for Debouncer<T> {
	fn default() -> Self {
		Self::new(DEFAULT_DEBOUNCE)
	}
}

impl<T> Debouncer<T> {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: None,
			pending_since: None,
		}
	}

	/// Replaces the pending value and restarts the quiet period.
	pub fn request(&mut self, value: T, now: Instant) {
		self.pending = Some(value);
		self.pending_since = Some(now);
	}

	/// Returns the pending value once the quiet period has elapsed.
	pub fn poll(&mut self, now: Instant) -> Option<T> {
		let since = self.pending_since?;
		if now.saturating_duration_since(since) < self.delay {
			return None;
		}
		self.pending_since = None;
		self.pending.take()
	}

	/// Whether a value is waiting to be released.
	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn releases_only_after_quiet_period() {
		let start = Instant::now();
		let mut debouncer = Debouncer::new(Duration::from_millis(100));

		debouncer.request(1, start);
		debouncer.request(2, start + Duration::from_millis(60));
		assert_eq!(debouncer.poll(start + Duration::from_millis(120)), None);
		assert_eq!(debouncer.poll(start + Duration::from_millis(160)), Some(2));
		assert!(!debouncer.is_pending());
		assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
	}
}
