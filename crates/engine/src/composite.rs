//! Render ordering and the derived composite snapshot.
//!
//! # Ordering
//!
//! "a before b" (a renders above b) is decided by, in priority order:
//!
//! 1. opacity class: transparent layers precede opaque ones, whatever else
//!    differs;
//! 2. group rank in [`EngineConfig::groups`];
//! 3. enabled before disabled;
//! 4. `group_index` ascending;
//! 5. name ascending, then id, so the order is total.
//!
//! # Opacity class
//!
//! Groups flagged `never_opaque` are always transparent. Any other layer is
//! opaque iff its effective opacity (the maximum resolved opacity over its
//! style layers, 1 when none resolve) reaches 1.

use std::cmp::Ordering;
use std::sync::Arc;

use strata_style::{BoundingBox, CapabilityCache, InterfacedLayer, InterfacedSource, StyleFragment, merge};

use crate::config::EngineConfig;
use crate::record::{LayerRecord, UiMode};

/// A record together with the facts the resolver derived for it.
#[derive(Debug, Clone)]
pub struct CompositedLayer {
	pub record: Arc<LayerRecord>,
	pub opacity: f64,
	pub opaque: bool,
	pub group_rank: usize,
	pub layers: Vec<Arc<InterfacedLayer>>,
	pub sources: Vec<Arc<InterfacedSource>>,
}

impl CompositedLayer {
	pub fn id(&self) -> &str {
		self.record.id()
	}

	/// Union of the declared source bounds. `None` means unbounded: the layer
	/// has no sources, or at least one source without bounds.
	pub fn bounds(&self) -> Option<BoundingBox> {
		let mut declared = self.sources.iter().map(|source| source.bounds);
		let first = declared.next()??;
		declared.try_fold(first, |acc, bounds| Some(acc.union(&bounds?)))
	}

	/// Unbounded layers intersect everything.
	pub fn intersects(&self, viewport: &BoundingBox) -> bool {
		self.bounds().is_none_or(|bounds| bounds.intersects(viewport))
	}
}

/// Derives the composite facts for one record through the capability cache.
pub fn classify(record: Arc<LayerRecord>, config: &EngineConfig, cache: &CapabilityCache) -> CompositedLayer {
	let layers: Vec<_> = record.style.layers.iter().map(|layer| cache.layer(layer)).collect();
	let sources: Vec<_> = record
		.style
		.sources
		.iter()
		.map(|(id, source)| cache.source(id, source))
		.collect();
	let opacity = effective_opacity(&layers);
	let opaque = !config.is_never_opaque(record.group()) && opacity >= 1.0;
	CompositedLayer {
		group_rank: config.group_rank(record.group()),
		record,
		opacity,
		opaque,
		layers,
		sources,
	}
}

fn effective_opacity(layers: &[Arc<InterfacedLayer>]) -> f64 {
	layers
		.iter()
		.filter_map(|layer| layer.opacity)
		.reduce(f64::max)
		.unwrap_or(1.0)
}

/// Render-order comparator; `Less` means `a` is drawn above `b`.
pub fn compare(a: &CompositedLayer, b: &CompositedLayer) -> Ordering {
	a.opaque
		.cmp(&b.opaque)
		.then(a.group_rank.cmp(&b.group_rank))
		.then(b.record.user.enabled.cmp(&a.record.user.enabled))
		.then(a.record.user.group_index.cmp(&b.record.user.group_index))
		.then_with(|| a.record.name().cmp(b.record.name()))
		.then_with(|| a.record.id().cmp(b.record.id()))
}

/// Everything observers need about the currently visible layers.
///
/// Built whole by [`resolve`] and published atomically; never mutated.
#[derive(Debug, Clone)]
pub struct CompositeSnapshot {
	pub version: u64,
	/// Visible layers, topmost first.
	pub layers: Vec<CompositedLayer>,
	pub top_opaque: Option<Arc<LayerRecord>>,
	pub needs_dark_ui: bool,
	pub has_multiple_opaque: bool,
	/// Transparent layers plus the top opaque one, in render order.
	pub revealed: Vec<Arc<LayerRecord>>,
	pub is_empty: bool,
	/// The merged style document for the renderer.
	pub style: StyleFragment,
}

impl CompositeSnapshot {
	pub fn empty(version: u64) -> Self {
		Self {
			version,
			layers: Vec::new(),
			top_opaque: None,
			needs_dark_ui: true,
			has_multiple_opaque: false,
			revealed: Vec::new(),
			is_empty: true,
			style: StyleFragment::default(),
		}
	}

	pub fn layer(&self, id: &str) -> Option<&CompositedLayer> {
		self.layers.iter().find(|layer| layer.id() == id)
	}

	pub fn sorted_ids(&self) -> Vec<&str> {
		self.layers.iter().map(CompositedLayer::id).collect()
	}

	pub fn is_revealed(&self, id: &str) -> bool {
		self.revealed.iter().any(|record| record.id() == id)
	}
}

/// Sorts the visible records, derives the aggregate facts and merges their
/// fragments. Pure; runs on the background worker.
pub fn resolve(
	records: &[Arc<LayerRecord>],
	config: &EngineConfig,
	cache: &CapabilityCache,
	version: u64,
) -> CompositeSnapshot {
	let mut layers: Vec<_> = records
		.iter()
		.filter(|record| record.visible)
		.map(|record| classify(Arc::clone(record), config, cache))
		.collect();
	layers.sort_by(compare);

	let top_index = layers.iter().position(|layer| layer.opaque);
	let opaque_count = layers.iter().filter(|layer| layer.opaque).count();
	let reference = top_index.or(if layers.is_empty() { None } else { Some(0) });
	let needs_dark_ui = reference.is_none_or(|index| {
		let record = &layers[index].record;
		match record.metadata.override_ui_mode {
			Some(mode) => mode == UiMode::Dark,
			None => config.prefers_dark_ui(record.group()),
		}
	});
	let revealed = layers
		.iter()
		.enumerate()
		.filter(|(index, layer)| !layer.opaque || Some(*index) == top_index)
		.map(|(_, layer)| Arc::clone(&layer.record))
		.collect();
	let style = merge(layers.iter().map(|layer| &layer.record.style), config.merge_options());

	CompositeSnapshot {
		version,
		top_opaque: top_index.map(|index| Arc::clone(&layers[index].record)),
		needs_dark_ui,
		has_multiple_opaque: opaque_count > 1,
		revealed,
		is_empty: layers.is_empty(),
		style,
		layers,
	}
}
