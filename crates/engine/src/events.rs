//! Explicit subscriber registry for engine notifications.

use std::fmt;
use std::sync::Arc;

use crate::composite::CompositeSnapshot;
use crate::warnings::Warning;

/// Notification delivered to subscribers on the caller's context.
#[derive(Debug, Clone)]
pub enum EngineEvent {
	/// A newer composite snapshot was published.
	SnapshotChanged(Arc<CompositeSnapshot>),
	/// The warning set differs from the last one delivered.
	WarningsChanged(Arc<[Warning]>),
}

/// Token returned by [`Subscribers::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback = Box<dyn FnMut(&EngineEvent) + Send>;

#[derive(Default)]
pub struct Subscribers {
	next_id: u64,
	entries: Vec<(Subscription, Callback)>,
}

impl fmt::Debug for Subscribers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscribers").field("len", &self.entries.len()).finish()
	}
}

impl Subscribers {
	pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + Send + 'static) -> Subscription {
		self.next_id += 1;
		let token = Subscription(self.next_id);
		self.entries.push((token, Box::new(callback)));
		token
	}

	/// Returns `false` if the token was unknown or already removed.
	pub fn unsubscribe(&mut self, token: Subscription) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(existing, _)| *existing != token);
		self.entries.len() != before
	}

	/// Calls every subscriber in subscription order.
	pub fn emit(&mut self, event: &EngineEvent) {
		for (_, callback) in &mut self.entries {
			callback(event);
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
