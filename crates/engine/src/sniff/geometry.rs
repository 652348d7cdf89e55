//! GeoJSON import: features are split by geometry family into one generated
//! source and style layer per family.

use rand::Rng;
use serde_json::{Map, Value, json};
use strata_style::{Rgba, StyleFragment, json as path};

use crate::record::LayerMetadata;
use crate::transport::LayerDefinitionTransport;

const GEOMETRY_TYPES: &[&str] = &[
	"Point",
	"MultiPoint",
	"LineString",
	"MultiLineString",
	"Polygon",
	"MultiPolygon",
	"GeometryCollection",
];

/// Whether `value` has the top-level shape of a GeoJSON object.
pub fn is_geojson(value: &Value) -> bool {
	match path::get_str(value, &["type"]) {
		Some("FeatureCollection") => value.get("features").is_some_and(Value::is_array),
		Some("Feature") => value.get("geometry").is_some(),
		Some(kind) if GEOMETRY_TYPES.contains(&kind) => {
			value.get("coordinates").is_some() || value.get("geometries").is_some()
		}
		_ => false,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Family {
	Polygons,
	Lines,
	Points,
}

impl Family {
	/// Bottom-to-top draw order of the generated layers.
	const DRAW_ORDER: [Self; 3] = [Self::Polygons, Self::Lines, Self::Points];

	fn of(geometry_type: &str) -> Option<Self> {
		match geometry_type {
			"Point" | "MultiPoint" => Some(Self::Points),
			"LineString" | "MultiLineString" => Some(Self::Lines),
			"Polygon" | "MultiPolygon" => Some(Self::Polygons),
			_ => None,
		}
	}

	fn suffix(self) -> &'static str {
		match self {
			Self::Polygons => "polygons",
			Self::Lines => "lines",
			Self::Points => "points",
		}
	}

	fn style_layer(self, id: &str, source: &str, colour: &str) -> Value {
		match self {
			Self::Polygons => json!({
				"id": id,
				"type": "fill",
				"source": source,
				"paint": { "fill-color": colour, "fill-opacity": 0.4 }
			}),
			Self::Lines => json!({
				"id": id,
				"type": "line",
				"source": source,
				"layout": { "line-cap": "round", "line-join": "round" },
				"paint": {
					"line-color": colour,
					"line-width": ["interpolate", ["linear"], ["zoom"], 4, 1.5, 16, 6]
				}
			}),
			Self::Points => json!({
				"id": id,
				"type": "circle",
				"source": source,
				"paint": {
					"circle-color": colour,
					"circle-radius": ["interpolate", ["linear"], ["zoom"], 4, 2, 16, 7],
					"circle-stroke-color": "#ffffff",
					"circle-stroke-width": 1
				}
			}),
		}
	}
}

/// Features sorted by geometry family.
#[derive(Debug, Default)]
pub(super) struct Buckets {
	polygons: Vec<Value>,
	lines: Vec<Value>,
	points: Vec<Value>,
}

impl Buckets {
	pub(super) fn push(&mut self, family: Family, feature: Value) {
		self.bucket_mut(family).push(feature);
	}

	fn bucket_mut(&mut self, family: Family) -> &mut Vec<Value> {
		match family {
			Family::Polygons => &mut self.polygons,
			Family::Lines => &mut self.lines,
			Family::Points => &mut self.points,
		}
	}

	fn is_empty(&self) -> bool {
		self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty()
	}

	/// Sorts one feature, flattening geometry collections into one feature
	/// per member with the parent's properties.
	fn insert_feature(&mut self, feature: Value) {
		let Some(geometry) = feature.get("geometry") else {
			return;
		};
		match path::get_str(geometry, &["type"]) {
			Some("GeometryCollection") => {
				let properties = feature.get("properties").cloned().unwrap_or_else(|| json!({}));
				let members = geometry.get("geometries").and_then(Value::as_array).cloned().unwrap_or_default();
				for member in members {
					self.insert_feature(feature_of(member, properties.clone()));
				}
			}
			Some(kind) => {
				if let Some(family) = Family::of(kind) {
					self.push(family, feature);
				}
			}
			None => {}
		}
	}
}

/// Wraps a bare geometry as a feature.
pub(super) fn feature_of(geometry: Value, properties: Value) -> Value {
	json!({ "type": "Feature", "properties": properties, "geometry": geometry })
}

pub(super) fn from_geojson(value: &Value, name: &str, group: &str) -> Option<LayerDefinitionTransport> {
	let mut buckets = Buckets::default();
	match path::get_str(value, &["type"]) {
		Some("FeatureCollection") => {
			for feature in value.get("features").and_then(Value::as_array).into_iter().flatten() {
				buckets.insert_feature(feature.clone());
			}
		}
		Some("Feature") => buckets.insert_feature(value.clone()),
		_ => buckets.insert_feature(feature_of(value.clone(), json!({}))),
	}
	build(buckets, name, group)
}

/// One transport with a source and a style layer per non-empty family.
/// `None` when no feature was usable.
pub(super) fn build(mut buckets: Buckets, name: &str, group: &str) -> Option<LayerDefinitionTransport> {
	if buckets.is_empty() {
		return None;
	}
	let id = uuid::Uuid::new_v4().to_string();
	let mut style = StyleFragment::default();
	for family in Family::DRAW_ORDER {
		let features = std::mem::take(buckets.bucket_mut(family));
		if features.is_empty() {
			continue;
		}
		let part_id = format!("{id}-{}", family.suffix());
		let mut data = Map::new();
		data.insert("type".into(), Value::from("FeatureCollection"));
		data.insert("features".into(), Value::Array(features));
		style
			.sources
			.insert(part_id.clone(), json!({ "type": "geojson", "data": data }));
		style.layers.push(family.style_layer(&part_id, &part_id, &random_colour()));
	}
	Some(LayerDefinitionTransport::new(LayerMetadata::new(id, name, group), style))
}

fn random_colour() -> String {
	let mut rng = rand::thread_rng();
	Rgba::from_rgb8(rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)).to_string()
}
