use std::hash::Hasher;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHasher};
use serde_json::Value;

use super::{InterfacedLayer, InterfacedSource};
use crate::fragment::StyleFragment;
use crate::json::content_hash;

#[derive(Default)]
struct Entries {
	layers: FxHashMap<u64, Arc<InterfacedLayer>>,
	sources: FxHashMap<u64, Arc<InterfacedSource>>,
}

/// Entry counts, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
	pub layers: usize,
	pub sources: usize,
}

/// Content-addressed cache of interfaced views.
///
/// Layers are keyed by `content_hash(layer)`, sources by
/// `hash(id, content_hash(source))`. Every read and write goes through one
/// mutex; derivation itself runs outside the lock so a long bounds scan never
/// blocks a foreground lookup.
#[derive(Default)]
pub struct CapabilityCache {
	entries: Mutex<Entries>,
}

impl CapabilityCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached view for `layer`, deriving it on a miss.
	pub fn layer(&self, layer: &Value) -> Arc<InterfacedLayer> {
		let key = content_hash(layer);
		let cached = self.entries.lock().layers.get(&key).cloned();
		if let Some(hit) = cached {
			return hit;
		}
		let derived = Arc::new(InterfacedLayer::from_spec(layer));
		self.entries.lock().layers.entry(key).or_insert(derived).clone()
	}

	/// Returns the cached view for source `id`, deriving it on a miss.
	pub fn source(&self, id: &str, source: &Value) -> Arc<InterfacedSource> {
		let key = source_key(id, source);
		let cached = self.entries.lock().sources.get(&key).cloned();
		if let Some(hit) = cached {
			return hit;
		}
		let derived = Arc::new(InterfacedSource::from_spec(id, source));
		self.entries.lock().sources.entry(key).or_insert(derived).clone()
	}

	/// Drops the entry derived from `layer`. Call before mutating it.
	pub fn invalidate_layer(&self, layer: &Value) -> bool {
		self.entries.lock().layers.remove(&content_hash(layer)).is_some()
	}

	/// Drops the entry derived from source `id`. Call before mutating it.
	pub fn invalidate_source(&self, id: &str, source: &Value) -> bool {
		self.entries.lock().sources.remove(&source_key(id, source)).is_some()
	}

	/// Drops every entry derived from `fragment`.
	pub fn invalidate_fragment(&self, fragment: &StyleFragment) {
		let mut entries = self.entries.lock();
		for layer in &fragment.layers {
			entries.layers.remove(&content_hash(layer));
		}
		for (id, source) in &fragment.sources {
			entries.sources.remove(&source_key(id, source));
		}
	}

	/// Empties the cache, e.g. on a memory-pressure signal.
	pub fn clear(&self) {
		let mut entries = self.entries.lock();
		tracing::debug!(
			layers = entries.layers.len(),
			sources = entries.sources.len(),
			"capability_cache.clear"
		);
		entries.layers.clear();
		entries.sources.clear();
	}

	pub fn stats(&self) -> CacheStats {
		let entries = self.entries.lock();
		CacheStats {
			layers: entries.layers.len(),
			sources: entries.sources.len(),
		}
	}
}

fn source_key(id: &str, source: &Value) -> u64 {
	let mut hasher = FxHasher::default();
	hasher.write(id.as_bytes());
	hasher.write_u8(0xff);
	hasher.write_u64(content_hash(source));
	hasher.finish()
}
