//! Diagnostics derived from the composite snapshot and the viewport.

use std::sync::Arc;
use std::time::Instant;

use strata_style::BoundingBox;
use strata_worker::Debouncer;

use crate::composite::CompositeSnapshot;
use crate::config::EngineConfig;

/// The visible map region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
	pub bounds: BoundingBox,
	pub zoom: f64,
}

/// A problem with the current composite, carrying what a single corrective
/// action needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
	/// Layers exist but nothing renders.
	EmptyStyle,
	/// Zooming to `target_zoom` brings the composited sources into range.
	MinZoomTooLow { target_zoom: f64 },
	/// Every composited source lies outside the viewport; `bounds` is their union.
	OutOfBounds { bounds: BoundingBox },
	/// More than one opaque layer is visible; all but the first are occluded.
	MultipleOpaque { layers: Vec<String> },
	/// Style layers of `layer` resolve to opacity 0.
	ZeroOpacity { layer: String, sublayers: Vec<String> },
}

/// Computes the warning set for `snapshot`.
///
/// `total_layers` counts every record, visible or not. Viewport-dependent
/// warnings are skipped until a viewport is known.
pub fn check(
	snapshot: &CompositeSnapshot,
	total_layers: usize,
	viewport: Option<&Viewport>,
	tolerance: f64,
) -> Vec<Warning> {
	let mut warnings = Vec::new();
	if snapshot.style.layers.is_empty() && total_layers > 0 {
		warnings.push(Warning::EmptyStyle);
	}

	let sources: Vec<_> = snapshot.layers.iter().flat_map(|layer| layer.sources.iter()).collect();
	if let Some(viewport) = viewport
		&& !sources.is_empty()
	{
		let min_coverage = sources
			.iter()
			.map(|source| source.min_zoom.unwrap_or(0.0))
			.fold(f64::INFINITY, f64::min);
		if viewport.zoom < min_coverage - tolerance {
			warnings.push(Warning::MinZoomTooLow {
				target_zoom: min_coverage,
			});
		}

		let declared: Option<Vec<BoundingBox>> = sources.iter().map(|source| source.bounds).collect();
		if let Some(declared) = declared
			&& !declared.iter().any(|bounds| bounds.intersects(&viewport.bounds))
			&& let Some(bounds) = declared.iter().copied().reduce(|acc, bounds| acc.union(&bounds))
		{
			warnings.push(Warning::OutOfBounds { bounds });
		}
	}

	let opaque: Vec<String> = snapshot
		.layers
		.iter()
		.filter(|layer| layer.opaque)
		.map(|layer| layer.id().to_owned())
		.collect();
	if opaque.len() > 1 {
		warnings.push(Warning::MultipleOpaque { layers: opaque });
	}

	for layer in &snapshot.layers {
		let sublayers: Vec<String> = layer
			.layers
			.iter()
			.filter(|sublayer| sublayer.opacity == Some(0.0))
			.map(|sublayer| sublayer.id.clone())
			.collect();
		if !sublayers.is_empty() {
			warnings.push(Warning::ZeroOpacity {
				layer: layer.id().to_owned(),
				sublayers,
			});
		}
	}
	warnings
}

/// Keeps the last published warning set and only reports changes.
///
/// Snapshot changes are checked immediately; viewport changes go through a
/// [`Debouncer`] so continuous motion is checked once it settles.
#[derive(Debug)]
pub struct ConsistencyChecker {
	tolerance: f64,
	viewport: Option<Viewport>,
	pending: Debouncer<Viewport>,
	current: Arc<[Warning]>,
}

impl ConsistencyChecker {
	pub fn new(config: &EngineConfig) -> Self {
		Self {
			tolerance: config.min_zoom_tolerance,
			viewport: None,
			pending: Debouncer::new(config.warning_debounce()),
			current: Arc::from([]),
		}
	}

	pub fn warnings(&self) -> &Arc<[Warning]> {
		&self.current
	}

	pub fn viewport(&self) -> Option<&Viewport> {
		self.viewport.as_ref()
	}

	/// Rechecks against `snapshot`; returns the new set if it differs.
	pub fn refresh(&mut self, snapshot: &CompositeSnapshot, total_layers: usize) -> Option<Arc<[Warning]>> {
		let next = check(snapshot, total_layers, self.viewport.as_ref(), self.tolerance);
		if *next == *self.current {
			return None;
		}
		tracing::debug!(count = next.len(), "warnings.changed");
		self.current = Arc::from(next);
		Some(Arc::clone(&self.current))
	}

	/// Records a viewport change, to be checked once motion settles.
	pub fn request_viewport(&mut self, viewport: Viewport, now: Instant) {
		self.pending.request(viewport, now);
	}

	/// Applies a settled viewport, if any, and rechecks.
	pub fn poll(&mut self, snapshot: &CompositeSnapshot, total_layers: usize, now: Instant) -> Option<Arc<[Warning]>> {
		let viewport = self.pending.poll(now)?;
		self.viewport = Some(viewport);
		self.refresh(snapshot, total_layers)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use pretty_assertions::assert_eq;
	use serde_json::json;
	use strata_style::{CapabilityCache, LngLat, StyleFragment};

	use super::*;
	use crate::composite::resolve;
	use crate::config::groups;
	use crate::record::{LayerMetadata, LayerRecord};

	fn raster(id: &str, group: &str, min_zoom: f64, bounds: [f64; 4], opacity: f64) -> Arc<LayerRecord> {
		let style: StyleFragment = serde_json::from_value(json!({
			"version": 8,
			"sources": { id: { "type": "raster", "minzoom": min_zoom, "bounds": bounds } },
			"layers": [{ "id": id, "type": "raster", "source": id, "paint": { "raster-opacity": opacity } }]
		}))
		.unwrap();
		let mut record = LayerRecord::new(LayerMetadata::new(id, id, group), style);
		record.visible = true;
		Arc::new(record)
	}

	fn snapshot(records: &[Arc<LayerRecord>]) -> CompositeSnapshot {
		resolve(records, &EngineConfig::default(), &CapabilityCache::new(), 1)
	}

	fn viewport(zoom: f64, west: f64, south: f64) -> Viewport {
		Viewport {
			bounds: BoundingBox::new(LngLat::new(west, south), LngLat::new(west + 1.0, south + 1.0)),
			zoom,
		}
	}

	#[test]
	fn empty_style_only_when_layers_exist() {
		let empty = snapshot(&[]);
		assert_eq!(check(&empty, 0, None, 2.5), vec![]);
		assert_eq!(check(&empty, 3, None, 2.5), vec![Warning::EmptyStyle]);
	}

	#[test]
	fn zoom_and_bounds_warnings_need_a_viewport() {
		let snap = snapshot(&[raster("alps", groups::AERIAL, 10.0, [5.0, 45.0, 11.0, 48.0], 1.0)]);
		assert_eq!(check(&snap, 1, None, 2.5), vec![]);

		let far = viewport(4.0, -80.0, 30.0);
		assert_eq!(
			check(&snap, 1, Some(&far), 2.5),
			vec![
				Warning::MinZoomTooLow { target_zoom: 10.0 },
				Warning::OutOfBounds {
					bounds: BoundingBox::new(LngLat::new(5.0, 45.0), LngLat::new(11.0, 48.0)),
				},
			]
		);

		let near = viewport(8.0, 6.0, 46.0);
		assert_eq!(check(&snap, 1, Some(&near), 2.5), vec![]);
	}

	#[test]
	fn multiple_opaque_and_zero_opacity() {
		let snap = snapshot(&[
			raster("a", groups::AERIAL, 0.0, [-180.0, -85.0, 180.0, 85.0], 1.0),
			raster("b", groups::BASE, 0.0, [-180.0, -85.0, 180.0, 85.0], 1.0),
			raster("ghost", groups::OVERLAY, 0.0, [-180.0, -85.0, 180.0, 85.0], 0.0),
		]);
		assert_eq!(
			check(&snap, 3, None, 2.5),
			vec![
				Warning::MultipleOpaque {
					layers: vec!["a".into(), "b".into()],
				},
				Warning::ZeroOpacity {
					layer: "ghost".into(),
					sublayers: vec!["ghost".into()],
				},
			]
		);
	}

	#[test]
	fn zero_opacity_names_transparent_sublayers_of_visible_layers() {
		let style: StyleFragment = serde_json::from_value(json!({
			"version": 8,
			"sources": { "base": { "type": "raster" }, "areas": { "type": "geojson", "data": { "type": "FeatureCollection", "features": [] } } },
			"layers": [
				{ "id": "base", "type": "raster", "source": "base" },
				{ "id": "hit", "type": "fill", "source": "areas", "paint": { "fill-color": "rgba(0, 0, 0, 0)" } }
			]
		}))
		.unwrap();
		let mut record = LayerRecord::new(LayerMetadata::new("base", "Base", groups::BASE), style);
		record.visible = true;
		let snap = snapshot(&[Arc::new(record)]);

		assert!(snap.layers[0].opaque);
		assert_eq!(
			check(&snap, 1, None, 2.5),
			vec![Warning::ZeroOpacity {
				layer: "base".into(),
				sublayers: vec!["hit".into()],
			}]
		);
	}

	#[test]
	fn checker_reports_changes_once_and_debounces_viewport() {
		let snap = snapshot(&[raster("alps", groups::AERIAL, 10.0, [5.0, 45.0, 11.0, 48.0], 1.0)]);
		let mut checker = ConsistencyChecker::new(&EngineConfig::default());
		assert_eq!(checker.refresh(&snap, 1), None);

		let start = Instant::now();
		checker.request_viewport(viewport(3.0, 6.0, 46.0), start);
		assert_eq!(checker.poll(&snap, 1, start + Duration::from_millis(50)), None);
		let changed = checker.poll(&snap, 1, start + Duration::from_millis(150)).unwrap();
		assert_eq!(&*changed, &[Warning::MinZoomTooLow { target_zoom: 10.0 }]);
		assert_eq!(checker.refresh(&snap, 1), None);
		assert_eq!(checker.viewport().map(|v| v.zoom), Some(3.0));
	}
}
