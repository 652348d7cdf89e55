use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation clock for superseding in-flight work.
///
/// Clones share the same counter, so a worker can stamp its result with the
/// generation it was started under and the receiver can discard anything
/// older than what it already published.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	next: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a new generation clock starting at generation 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next generation ID.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the most recently issued generation, or 0 if none.
	pub fn current(&self) -> u64 {
		self.next.load(Ordering::Acquire)
	}
}
