//! Capability-driven edits of a layer's raw style.
//!
//! The cached view of the raw value is invalidated before the value is
//! touched, so no reader can pair a stale view with new content.

use serde_json::Value;
use strata_style::{InterfacedLayer, PathError, Rgba};

use super::LayerEngine;
use crate::error::{EngineError, Result};
use crate::store::LayerStore;

impl<S: LayerStore> LayerEngine<S> {
	/// Writes a literal colour into style layer `sublayer` of layer `id`.
	/// Returns `false` if that style layer type has no colour property.
	pub fn set_layer_colour(&mut self, id: &str, sublayer: &str, colour: Rgba) -> Result<bool> {
		self.edit_sublayer(id, sublayer, |view, raw| view.write_colour(raw, colour))
	}

	/// Writes a literal opacity (clamped to `0..=1`) into style layer
	/// `sublayer` of layer `id`.
	pub fn set_layer_opacity(&mut self, id: &str, sublayer: &str, opacity: f64) -> Result<bool> {
		self.edit_sublayer(id, sublayer, |view, raw| view.write_opacity(raw, opacity))
	}

	/// Replaces source `source_id` of layer `id` with `source`.
	pub fn replace_source(&mut self, id: &str, source_id: &str, source: Value) -> Result<()> {
		let index = self.require(id)?;
		let previous = self.layers[index]
			.style
			.sources
			.get(source_id)
			.ok_or_else(|| EngineError::UnknownSource {
				layer: id.to_owned(),
				source_id: source_id.to_owned(),
			})?;
		self.cache.invalidate_source(source_id, previous);
		self.modify(index, |record| {
			record.style.sources.insert(source_id.to_owned(), source);
		})?;
		self.save()
	}

	fn edit_sublayer(
		&mut self,
		id: &str,
		sublayer: &str,
		write: impl FnOnce(&InterfacedLayer, &mut Value) -> Result<bool, PathError>,
	) -> Result<bool> {
		let index = self.require(id)?;
		let record = &self.layers[index];
		let position = record
			.style
			.layer_position(sublayer)
			.ok_or_else(|| EngineError::UnknownSublayer {
				layer: id.to_owned(),
				sublayer: sublayer.to_owned(),
			})?;
		let raw = &record.style.layers[position];
		let view = self.cache.layer(raw);
		if !view.capabilities.is_empty() {
			self.cache.invalidate_layer(raw);
		}

		let mut updated = record.as_ref().clone();
		if !write(&*view, &mut updated.style.layers[position])? {
			return Ok(false);
		}
		self.replace(index, updated)?;
		self.save()?;
		Ok(true)
	}
}
