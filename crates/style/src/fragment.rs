//! Style fragments: the slice of a style document owned by one layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json;

/// The only style format version this workspace reads or writes.
pub const STYLE_VERSION: u8 = 8;

/// Sources, layers and shared resources contributed by one map layer.
///
/// `sources` keeps insertion order so a merged document is byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleFragment {
	pub version: u8,
	pub sources: Map<String, Value>,
	pub layers: Vec<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sprite: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub glyphs: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub terrain: Option<Value>,
}

impl Default for StyleFragment {
	fn default() -> Self {
		Self {
			version: STYLE_VERSION,
			sources: Map::new(),
			layers: Vec::new(),
			sprite: None,
			glyphs: None,
			terrain: None,
		}
	}
}

impl StyleFragment {
	pub fn is_supported_version(&self) -> bool {
		self.version == STYLE_VERSION
	}

	/// Index of the style layer with the given `id`.
	pub fn layer_position(&self, id: &str) -> Option<usize> {
		self.layers.iter().position(|layer| layer_id(layer) == Some(id))
	}

	pub fn layer(&self, id: &str) -> Option<&Value> {
		self.layer_position(id).map(|i| &self.layers[i])
	}
}

pub fn layer_id(layer: &Value) -> Option<&str> {
	json::get_str(layer, &["id"])
}

/// Style layer `type` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
	Background,
	Fill,
	Line,
	Symbol,
	Circle,
	Heatmap,
	FillExtrusion,
	Raster,
	Hillshade,
	Other,
}

impl LayerKind {
	pub fn of(layer: &Value) -> Self {
		match json::get_str(layer, &["type"]) {
			Some("background") => Self::Background,
			Some("fill") => Self::Fill,
			Some("line") => Self::Line,
			Some("symbol") => Self::Symbol,
			Some("circle") => Self::Circle,
			Some("heatmap") => Self::Heatmap,
			Some("fill-extrusion") => Self::FillExtrusion,
			Some("raster") => Self::Raster,
			Some("hillshade") => Self::Hillshade,
			_ => Self::Other,
		}
	}
}

/// Source `type` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
	Vector,
	Raster,
	RasterDem,
	GeoJson,
	Other,
}

impl SourceKind {
	pub fn of(source: &Value) -> Self {
		match json::get_str(source, &["type"]) {
			Some("vector") => Self::Vector,
			Some("raster") => Self::Raster,
			Some("raster-dem") => Self::RasterDem,
			Some("geojson") => Self::GeoJson,
			_ => Self::Other,
		}
	}
}
