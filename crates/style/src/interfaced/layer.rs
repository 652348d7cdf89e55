use bitflags::bitflags;
use serde_json::Value;

use crate::colour::Rgba;
use crate::fragment::{LayerKind, layer_id};
use crate::json::{self, PathError};

bitflags! {
	/// Editable paint capabilities of a style layer.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct LayerCapabilities: u8 {
		const COLOUR = 1 << 0;
		const OPACITY = 1 << 1;
	}
}

/// Paint property names feeding colour and opacity for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaintKeys {
	colour: Option<&'static str>,
	opacity: &'static str,
}

impl PaintKeys {
	const fn both(colour: &'static str, opacity: &'static str) -> Option<Self> {
		Some(Self {
			colour: Some(colour),
			opacity,
		})
	}

	const fn opacity_only(opacity: &'static str) -> Option<Self> {
		Some(Self { colour: None, opacity })
	}

	fn lookup(kind: LayerKind, layer: &Value) -> Option<Self> {
		match kind {
			LayerKind::Line => Self::both("line-color", "line-opacity"),
			LayerKind::Circle => Self::both("circle-color", "circle-opacity"),
			LayerKind::Fill => Self::both("fill-color", "fill-opacity"),
			LayerKind::FillExtrusion => Self::both("fill-extrusion-color", "fill-extrusion-opacity"),
			LayerKind::Background => Self::both("background-color", "background-opacity"),
			LayerKind::Symbol if json::get(layer, &["layout", "text-field"]).is_some() => {
				Self::both("text-color", "text-opacity")
			}
			LayerKind::Symbol => Self::both("icon-color", "icon-opacity"),
			LayerKind::Raster => Self::opacity_only("raster-opacity"),
			LayerKind::Heatmap => Self::opacity_only("heatmap-opacity"),
			LayerKind::Hillshade | LayerKind::Other => None,
		}
	}
}

/// Colour/opacity view over one raw style layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfacedLayer {
	pub id: String,
	pub kind: LayerKind,
	pub capabilities: LayerCapabilities,
	pub colour: Option<Rgba>,
	pub opacity: Option<f64>,
	pub colour_is_expression: bool,
	pub opacity_is_expression: bool,
	keys: Option<PaintKeys>,
}

impl InterfacedLayer {
	/// Derives the view from a raw style layer.
	pub fn from_spec(layer: &Value) -> Self {
		let kind = LayerKind::of(layer);
		let keys = PaintKeys::lookup(kind, layer);
		let mut view = Self {
			id: layer_id(layer).unwrap_or_default().to_owned(),
			kind,
			capabilities: LayerCapabilities::empty(),
			colour: None,
			opacity: None,
			colour_is_expression: false,
			opacity_is_expression: false,
			keys,
		};
		let Some(keys) = keys else {
			return view;
		};

		view.capabilities |= LayerCapabilities::OPACITY;
		if let Some(colour_key) = keys.colour {
			view.capabilities |= LayerCapabilities::COLOUR;
			match json::get(layer, &["paint", colour_key]) {
				Some(Value::String(literal)) => view.colour = Rgba::parse(literal),
				Some(expression @ Value::Array(_)) => {
					view.colour_is_expression = true;
					view.colour = first_literal_colour(expression);
				}
				_ => {}
			}
		}

		view.opacity = match json::get(layer, &["paint", keys.opacity]) {
			Some(Value::Number(n)) => n.as_f64(),
			Some(Value::Array(_)) => {
				view.opacity_is_expression = true;
				None
			}
			_ if view.colour_is_expression => Some(1.0),
			_ => Some(view.colour.map_or(1.0, |c| f64::from(c.a))),
		};

		if let (Some(colour), Some(opacity)) = (view.colour, view.opacity) {
			view.colour = Some(colour.with_alpha(opacity));
		}
		view
	}

	/// Writes a literal colour into `layer`'s paint block.
	///
	/// Returns `false` when this layer type has no colour property.
	pub fn write_colour(&self, layer: &mut Value, colour: Rgba) -> Result<bool, PathError> {
		let Some(key) = self.keys.and_then(|keys| keys.colour) else {
			return Ok(false);
		};
		json::set(layer, &["paint", key], Value::String(colour.to_string()))?;
		Ok(true)
	}

	/// Writes a literal opacity into `layer`'s paint block.
	///
	/// Returns `false` when this layer type has no opacity property.
	pub fn write_opacity(&self, layer: &mut Value, opacity: f64) -> Result<bool, PathError> {
		let Some(keys) = self.keys else {
			return Ok(false);
		};
		json::set(layer, &["paint", keys.opacity], Value::from(opacity.clamp(0.0, 1.0)))?;
		Ok(true)
	}
}

/// Depth-first search for the first string in an expression that parses as
/// a colour. Preview only; the expression itself is never evaluated.
fn first_literal_colour(expression: &Value) -> Option<Rgba> {
	match expression {
		Value::String(s) => Rgba::parse(s),
		Value::Array(items) => items.iter().find_map(first_literal_colour),
		_ => None,
	}
}
