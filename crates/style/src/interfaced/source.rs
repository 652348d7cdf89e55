use std::sync::Arc;

use bitflags::bitflags;
use serde_json::Value;

use crate::fragment::SourceKind;
use crate::geo::{BoundingBox, LngLat};
use crate::json;

bitflags! {
	/// Zoom/extent capabilities of a style source.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct SourceCapabilities: u8 {
		const MIN_ZOOM = 1 << 0;
		const MAX_ZOOM = 1 << 1;
		const BOUNDS = 1 << 2;
	}
}

/// Geometry payload of an embedded-geometry source.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoData {
	Inline(Arc<Value>),
	Url(String),
}

/// Zoom range and extent view over one raw style source.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfacedSource {
	pub id: String,
	pub kind: SourceKind,
	pub capabilities: SourceCapabilities,
	pub min_zoom: Option<f64>,
	pub max_zoom: Option<f64>,
	pub bounds: Option<BoundingBox>,
	pub data: Option<GeoData>,
}

impl InterfacedSource {
	/// Derives the view from a raw source. Inline geometry is scanned in full
	/// to compute bounds, which is why these views are cached.
	pub fn from_spec(id: &str, source: &Value) -> Self {
		let kind = SourceKind::of(source);
		let mut view = Self {
			id: id.to_owned(),
			kind,
			capabilities: SourceCapabilities::empty(),
			min_zoom: None,
			max_zoom: None,
			bounds: None,
			data: None,
		};
		match kind {
			SourceKind::Vector | SourceKind::Raster | SourceKind::RasterDem => {
				view.capabilities = SourceCapabilities::all();
				view.min_zoom = json::get_f64(source, &["minzoom"]);
				view.max_zoom = json::get_f64(source, &["maxzoom"]);
				view.bounds = json::get(source, &["bounds"])
					.and_then(Value::as_array)
					.and_then(|values| BoundingBox::from_wsen(values));
			}
			SourceKind::GeoJson => {
				view.capabilities = SourceCapabilities::MAX_ZOOM | SourceCapabilities::BOUNDS;
				view.max_zoom = json::get_f64(source, &["maxzoom"]);
				match json::get(source, &["data"]) {
					Some(Value::String(url)) => view.data = Some(GeoData::Url(url.clone())),
					Some(data @ Value::Object(_)) => {
						view.bounds = geometry_bounds(data);
						view.data = Some(GeoData::Inline(Arc::new(data.clone())));
					}
					_ => {}
				}
			}
			SourceKind::Other => {}
		}
		view
	}
}

/// Envelope of every coordinate in a GeoJSON object.
///
/// Accepts feature collections, features, geometry collections and bare
/// geometries. Returns `None` when no position is found.
pub fn geometry_bounds(data: &Value) -> Option<BoundingBox> {
	let mut bounds = None;
	collect_bounds(data, &mut bounds);
	bounds
}

fn collect_bounds(value: &Value, bounds: &mut Option<BoundingBox>) {
	match json::get_str(value, &["type"]) {
		Some("FeatureCollection") => each(value, "features", bounds),
		Some("Feature") => {
			if let Some(geometry) = json::get(value, &["geometry"]) {
				collect_bounds(geometry, bounds);
			}
		}
		Some("GeometryCollection") => each(value, "geometries", bounds),
		Some(_) => {
			if let Some(coordinates) = json::get(value, &["coordinates"]) {
				scan_positions(coordinates, bounds);
			}
		}
		None => {}
	}
}

fn each(value: &Value, key: &str, bounds: &mut Option<BoundingBox>) {
	for item in json::get(value, &[key]).and_then(Value::as_array).into_iter().flatten() {
		collect_bounds(item, bounds);
	}
}

fn scan_positions(coordinates: &Value, bounds: &mut Option<BoundingBox>) {
	let Some(items) = coordinates.as_array() else {
		return;
	};
	match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
		(Some(lon), Some(lat)) => {
			let p = LngLat::new(lon, lat);
			match bounds {
				Some(b) => b.extend(p),
				None => *bounds = Some(BoundingBox::from_point(p)),
			}
		}
		_ => {
			for item in items {
				scan_positions(item, bounds);
			}
		}
	}
}
