//! The layer engine: owns the collection, its store and the capability
//! cache, and publishes composite snapshots.
//!
//! Every mutating operation updates the in-memory record (copy on write),
//! mirrors it into the [`LayerStore`], then calls [`LayerEngine::save`],
//! which commits the store and schedules a recompute. Recomputes run on the
//! worker pool and come back through a channel; [`LayerEngine::apply_pending`]
//! publishes the newest one on the caller's context before notifying
//! subscribers. Results older than the published snapshot are dropped.

mod collection;
mod edit;
mod visibility;

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use strata_style::CapabilityCache;
use strata_worker::{GenerationClock, TaskClass};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use self::visibility::{LayerFilter, QuickToggleOutcome};
use crate::composite::{self, CompositeSnapshot, CompositedLayer};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, Subscribers, Subscription};
use crate::record::LayerRecord;
use crate::store::LayerStore;
use crate::warnings::{ConsistencyChecker, Viewport, Warning};

/// Where [`LayerEngine::save`] computes the next snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecomputeMode {
	/// On the worker pool; publish with [`LayerEngine::apply_pending`].
	#[default]
	Background,
	/// Synchronously, publishing before `save` returns.
	Inline,
}

/// Cloneable read handle on the published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader(Arc<ArcSwap<CompositeSnapshot>>);

impl SnapshotReader {
	pub fn load(&self) -> Arc<CompositeSnapshot> {
		self.0.load_full()
	}
}

#[derive(Debug)]
struct Recomputed {
	generation: u64,
	snapshot: CompositeSnapshot,
}

pub struct LayerEngine<S> {
	config: Arc<EngineConfig>,
	store: S,
	layers: Vec<Arc<LayerRecord>>,
	cache: Arc<CapabilityCache>,
	published: Arc<ArcSwap<CompositeSnapshot>>,
	clock: GenerationClock,
	results_tx: mpsc::UnboundedSender<Recomputed>,
	results_rx: mpsc::UnboundedReceiver<Recomputed>,
	in_flight: Option<JoinHandle<()>>,
	subscribers: Subscribers,
	checker: ConsistencyChecker,
	quick_toggle_memory: Option<Vec<String>>,
	mode: RecomputeMode,
}

impl<S: LayerStore> LayerEngine<S> {
	/// Loads every committed record from `store` and publishes an initial
	/// snapshot synchronously.
	pub fn open(store: S, config: EngineConfig) -> Result<Self> {
		let layers: Vec<_> = store
			.fetch_all()
			.inspect_err(|error| tracing::warn!(%error, "store.fetch_failed"))?
			.into_iter()
			.map(Arc::new)
			.collect();
		let cache = Arc::new(CapabilityCache::new());
		let initial = composite::resolve(&layers, &config, &cache, 0);
		let mut checker = ConsistencyChecker::new(&config);
		checker.refresh(&initial, layers.len());
		let (results_tx, results_rx) = mpsc::unbounded_channel();
		tracing::debug!(layers = layers.len(), "engine.open");
		Ok(Self {
			config: Arc::new(config),
			store,
			layers,
			cache,
			published: Arc::new(ArcSwap::from_pointee(initial)),
			clock: GenerationClock::new(),
			results_tx,
			results_rx,
			in_flight: None,
			subscribers: Subscribers::default(),
			checker,
			quick_toggle_memory: None,
			mode: RecomputeMode::default(),
		})
	}

	pub fn with_recompute_mode(mut self, mode: RecomputeMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub fn cache(&self) -> &Arc<CapabilityCache> {
		&self.cache
	}

	/// Every record, in store order.
	pub fn layers(&self) -> &[Arc<LayerRecord>] {
		&self.layers
	}

	pub fn layer(&self, id: &str) -> Option<&Arc<LayerRecord>> {
		self.layers.iter().find(|record| record.id() == id)
	}

	/// The last published snapshot.
	pub fn snapshot(&self) -> Arc<CompositeSnapshot> {
		self.published.load_full()
	}

	pub fn snapshot_reader(&self) -> SnapshotReader {
		SnapshotReader(Arc::clone(&self.published))
	}

	pub fn warnings(&self) -> Arc<[Warning]> {
		Arc::clone(self.checker.warnings())
	}

	pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + Send + 'static) -> Subscription {
		self.subscribers.subscribe(callback)
	}

	pub fn unsubscribe(&mut self, token: Subscription) -> bool {
		self.subscribers.unsubscribe(token)
	}

	/// Drops every derived capability view.
	pub fn handle_memory_pressure(&self) {
		self.cache.clear();
	}

	/// Commits the store and schedules a recompute.
	pub fn save(&mut self) -> Result<()> {
		self.store
			.save()
			.inspect_err(|error| tracing::warn!(%error, "store.save_failed"))?;
		match self.mode {
			RecomputeMode::Inline => {
				self.recompute_now();
			}
			RecomputeMode::Background => {
				self.in_flight = Some(self.request_recompute());
			}
		}
		Ok(())
	}

	/// Resolves the current collection on the worker pool under a new
	/// generation. The result is published by [`apply_pending`](Self::apply_pending).
	pub fn request_recompute(&self) -> JoinHandle<()> {
		let generation = self.clock.next();
		let records = self.layers.clone();
		let config = Arc::clone(&self.config);
		let cache = Arc::clone(&self.cache);
		let results = self.results_tx.clone();
		tracing::debug!(layers = records.len(), generation, "composite.recompute_requested");
		strata_worker::spawn_blocking(TaskClass::CpuBlocking, move || {
			let snapshot = composite::resolve(&records, &config, &cache, generation);
			tracing::debug!(
				layers = snapshot.layers.len(),
				generation,
				"composite.recompute_finished"
			);
			if results.send(Recomputed { generation, snapshot }).is_err() {
				tracing::trace!(generation, "composite.engine_dropped");
			}
		})
	}

	/// Publishes the newest finished recompute, if it is newer than the
	/// published snapshot, and notifies subscribers.
	pub fn apply_pending(&mut self) -> Option<Arc<CompositeSnapshot>> {
		let mut newest: Option<Recomputed> = None;
		while let Ok(done) = self.results_rx.try_recv() {
			let floor = newest
				.as_ref()
				.map_or_else(|| self.published.load().version, |pending| pending.generation);
			if done.generation <= floor {
				tracing::debug!(generation = done.generation, floor, "composite.stale_dropped");
				continue;
			}
			newest = Some(done);
		}
		newest.map(|done| self.publish(done.snapshot))
	}

	/// Waits for the last scheduled recompute, then applies it.
	pub async fn settle(&mut self) -> Option<Arc<CompositeSnapshot>> {
		if let Some(handle) = self.in_flight.take()
			&& let Err(error) = handle.await
		{
			tracing::warn!(%error, "composite.recompute_failed");
		}
		self.apply_pending()
	}

	/// Resolves and publishes synchronously.
	pub fn recompute_now(&mut self) -> Arc<CompositeSnapshot> {
		let generation = self.clock.next();
		let snapshot = composite::resolve(&self.layers, &self.config, &self.cache, generation);
		self.publish(snapshot)
	}

	/// Records a viewport change; warnings follow once it settles.
	pub fn set_viewport(&mut self, viewport: Viewport, now: Instant) {
		self.checker.request_viewport(viewport, now);
	}

	/// Rechecks warnings for a settled viewport. Returns the new set if it
	/// changed.
	pub fn poll_warnings(&mut self, now: Instant) -> Option<Arc<[Warning]>> {
		let snapshot = self.published.load_full();
		let changed = self.checker.poll(&snapshot, self.layers.len(), now)?;
		self.subscribers.emit(&EngineEvent::WarningsChanged(Arc::clone(&changed)));
		Some(changed)
	}

	fn publish(&mut self, snapshot: CompositeSnapshot) -> Arc<CompositeSnapshot> {
		let snapshot = Arc::new(snapshot);
		self.published.store(Arc::clone(&snapshot));
		tracing::debug!(version = snapshot.version, layers = snapshot.layers.len(), "composite.published");
		self.subscribers.emit(&EngineEvent::SnapshotChanged(Arc::clone(&snapshot)));
		if let Some(warnings) = self.checker.refresh(&snapshot, self.layers.len()) {
			self.subscribers.emit(&EngineEvent::WarningsChanged(warnings));
		}
		snapshot
	}

	fn index_of(&self, id: &str) -> Option<usize> {
		self.layers.iter().position(|record| record.id() == id)
	}

	fn require(&self, id: &str) -> Result<usize> {
		self.index_of(id).ok_or_else(|| EngineError::UnknownLayer(id.to_owned()))
	}

	fn classify(&self, index: usize) -> CompositedLayer {
		composite::classify(Arc::clone(&self.layers[index]), &self.config, &self.cache)
	}

	/// Records selected by `keep`, in render order.
	fn sorted_where(&self, keep: impl Fn(&LayerRecord) -> bool) -> Vec<CompositedLayer> {
		let mut selected: Vec<_> = (0..self.layers.len())
			.filter(|&index| keep(&self.layers[index]))
			.map(|index| self.classify(index))
			.collect();
		selected.sort_by(composite::compare);
		selected
	}

	/// Applies `edit` to a copy of the record at `index`, mirrors it into the
	/// store and swaps it in.
	fn modify(&mut self, index: usize, edit: impl FnOnce(&mut LayerRecord)) -> Result<Arc<LayerRecord>> {
		let mut record = LayerRecord::clone(&self.layers[index]);
		edit(&mut record);
		self.replace(index, record)
	}

	fn replace(&mut self, index: usize, record: LayerRecord) -> Result<Arc<LayerRecord>> {
		let previous_id = self.layers[index].id().to_owned();
		self.store
			.update(&previous_id, &record)
			.inspect_err(|error| tracing::warn!(%error, id = previous_id.as_str(), "store.update_failed"))?;
		let record = Arc::new(record);
		self.layers[index] = Arc::clone(&record);
		Ok(record)
	}
}
