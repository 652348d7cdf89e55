use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::colour::Rgba;
use crate::fragment::{LayerKind, SourceKind, StyleFragment};
use crate::geo::{BoundingBox, LngLat};

#[test]
fn line_opacity_without_colour() {
	let view = InterfacedLayer::from_spec(&json!({
		"id": "trail",
		"type": "line",
		"paint": { "line-opacity": 0.5 }
	}));
	assert_eq!(view.kind, LayerKind::Line);
	assert_eq!(view.capabilities, LayerCapabilities::COLOUR | LayerCapabilities::OPACITY);
	assert_eq!(view.opacity, Some(0.5));
	assert_eq!(view.colour, None);
	assert!(!view.colour_is_expression);
	assert!(!view.opacity_is_expression);
}

#[test]
fn colour_alpha_follows_explicit_opacity() {
	let view = InterfacedLayer::from_spec(&json!({
		"id": "water",
		"type": "fill",
		"paint": { "fill-color": "#0000ff", "fill-opacity": 0.25 }
	}));
	assert_eq!(view.opacity, Some(0.25));
	assert_eq!(view.colour, Some(Rgba::new(0.0, 0.0, 1.0, 0.25)));
}

#[test]
fn opacity_derived_from_colour_alpha() {
	let view = InterfacedLayer::from_spec(&json!({
		"id": "dots",
		"type": "circle",
		"paint": { "circle-color": "rgba(255, 0, 0, 0.5)" }
	}));
	assert_eq!(view.opacity, Some(0.5));
	assert_eq!(view.colour.map(|c| c.a), Some(0.5));
}

#[test]
fn expressions_are_flagged_and_previewed() {
	let view = InterfacedLayer::from_spec(&json!({
		"id": "roads",
		"type": "line",
		"paint": {
			"line-color": ["match", ["get", "class"], "motorway", "#ff0000", "#999999"],
			"line-opacity": ["interpolate", ["linear"], ["zoom"], 5, 0, 10, 1]
		}
	}));
	assert!(view.colour_is_expression);
	assert!(view.opacity_is_expression);
	assert_eq!(view.opacity, None);
	assert_eq!(view.colour, Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
}

#[test]
fn expression_colour_without_opacity_is_fully_opaque() {
	let view = InterfacedLayer::from_spec(&json!({
		"id": "zones",
		"type": "fill",
		"paint": {
			"fill-color": ["case", ["get", "restricted"], "rgba(255, 0, 0, 0.5)", "#00ff00"]
		}
	}));
	assert!(view.colour_is_expression);
	assert!(!view.opacity_is_expression);
	assert_eq!(view.opacity, Some(1.0));
	assert_eq!(view.colour, Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
}

#[test]
fn symbol_table_depends_on_text_field() {
	let labelled = InterfacedLayer::from_spec(&json!({
		"id": "labels",
		"type": "symbol",
		"layout": { "text-field": "{name}" },
		"paint": { "text-opacity": 0.75, "icon-opacity": 0.1 }
	}));
	assert_eq!(labelled.opacity, Some(0.75));

	let icons = InterfacedLayer::from_spec(&json!({
		"id": "pois",
		"type": "symbol",
		"layout": { "icon-image": "marker" },
		"paint": { "text-opacity": 0.75, "icon-opacity": 0.1 }
	}));
	assert_eq!(icons.opacity, Some(0.1));
}

#[test]
fn raster_and_heatmap_are_opacity_only() {
	let raster = InterfacedLayer::from_spec(&json!({ "id": "sat", "type": "raster" }));
	assert_eq!(raster.capabilities, LayerCapabilities::OPACITY);
	assert_eq!(raster.opacity, Some(1.0));

	let heat = InterfacedLayer::from_spec(&json!({
		"id": "heat",
		"type": "heatmap",
		"paint": { "heatmap-opacity": 0.6 }
	}));
	assert_eq!(heat.capabilities, LayerCapabilities::OPACITY);
	assert_eq!(heat.opacity, Some(0.6));

	let hillshade = InterfacedLayer::from_spec(&json!({ "id": "relief", "type": "hillshade" }));
	assert!(hillshade.capabilities.is_empty());
	assert_eq!(hillshade.opacity, None);
}

#[test]
fn writes_back_into_paint() {
	let mut raw = json!({ "id": "trail", "type": "line" });
	let view = InterfacedLayer::from_spec(&raw);
	assert!(view.write_colour(&mut raw, Rgba::from_rgb8(255, 0, 0)).unwrap());
	assert!(view.write_opacity(&mut raw, 0.3).unwrap());

	let reread = InterfacedLayer::from_spec(&raw);
	assert_eq!(reread.opacity, Some(0.3));
	assert_eq!(reread.colour.map(|c| (c.r, c.g, c.b)), Some((1.0, 0.0, 0.0)));

	let mut relief = json!({ "id": "relief", "type": "hillshade" });
	let view = InterfacedLayer::from_spec(&relief);
	assert!(!view.write_opacity(&mut relief, 0.5).unwrap());
	assert_eq!(relief, json!({ "id": "relief", "type": "hillshade" }));
}

#[test]
fn geojson_bounds_scan_every_coordinate() {
	let source = json!({
		"type": "geojson",
		"maxzoom": 14,
		"data": {
			"type": "FeatureCollection",
			"features": [
				{ "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [-1.0, 51.0] } },
				{ "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [2.0, 53.0] } }
			]
		}
	});
	let view = InterfacedSource::from_spec("pins", &source);
	assert_eq!(view.kind, SourceKind::GeoJson);
	assert_eq!(view.capabilities, SourceCapabilities::MAX_ZOOM | SourceCapabilities::BOUNDS);
	assert_eq!(view.max_zoom, Some(14.0));
	assert_eq!(
		view.bounds,
		Some(BoundingBox {
			sw: LngLat::new(-1.0, 51.0),
			ne: LngLat::new(2.0, 53.0),
		})
	);
	assert!(matches!(view.data, Some(GeoData::Inline(_))));
}

#[test]
fn geojson_bounds_handle_nested_geometry() {
	let data = json!({
		"type": "GeometryCollection",
		"geometries": [
			{ "type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 3], [0, 0]]] },
			{ "type": "MultiLineString", "coordinates": [[[-2, 1], [1, 8]]] }
		]
	});
	let bounds = geometry_bounds(&data).unwrap();
	assert_eq!(bounds.sw, LngLat::new(-2.0, 0.0));
	assert_eq!(bounds.ne, LngLat::new(4.0, 8.0));
	assert_eq!(geometry_bounds(&json!({ "type": "FeatureCollection", "features": [] })), None);
}

#[test]
fn tile_sources_expose_explicit_fields() {
	let view = InterfacedSource::from_spec(
		"osm",
		&json!({ "type": "vector", "minzoom": 2, "maxzoom": 14, "bounds": [-10, 40, 5, 60] }),
	);
	assert_eq!(view.capabilities, SourceCapabilities::all());
	assert_eq!(view.min_zoom, Some(2.0));
	assert_eq!(view.max_zoom, Some(14.0));
	assert_eq!(view.bounds.map(|b| b.ne), Some(LngLat::new(5.0, 60.0)));

	let remote = InterfacedSource::from_spec("remote", &json!({ "type": "geojson", "data": "https://example.com/a.json" }));
	assert_eq!(remote.data, Some(GeoData::Url("https://example.com/a.json".to_owned())));
	assert_eq!(remote.bounds, None);

	let image = InterfacedSource::from_spec("img", &json!({ "type": "image" }));
	assert!(image.capabilities.is_empty());
}

#[test]
fn cache_shares_views_until_invalidated() {
	let cache = CapabilityCache::new();
	let layer = json!({ "id": "trail", "type": "line", "paint": { "line-opacity": 0.5 } });
	let first = cache.layer(&layer);
	let second = cache.layer(&layer);
	assert!(Arc::ptr_eq(&first, &second));

	assert!(cache.invalidate_layer(&layer));
	assert!(!cache.invalidate_layer(&layer));
	let third = cache.layer(&layer);
	assert!(!Arc::ptr_eq(&first, &third));
	assert_eq!(*first, *third);
}

#[test]
fn source_entries_are_keyed_by_id_and_content() {
	let cache = CapabilityCache::new();
	let source = json!({ "type": "raster", "maxzoom": 18 });
	let a = cache.source("a", &source);
	let b = cache.source("b", &source);
	assert_eq!(a.id, "a");
	assert_eq!(b.id, "b");
	assert_eq!(cache.stats(), CacheStats { layers: 0, sources: 2 });

	assert!(cache.invalidate_source("a", &source));
	assert_eq!(cache.stats().sources, 1);
}

#[test]
fn fragment_invalidation_and_clear() {
	let cache = CapabilityCache::new();
	let fragment: StyleFragment = serde_json::from_value(json!({
		"version": 8,
		"sources": { "osm": { "type": "vector" } },
		"layers": [{ "id": "water", "type": "fill" }, { "id": "roads", "type": "line" }]
	}))
	.unwrap();
	for layer in &fragment.layers {
		cache.layer(layer);
	}
	cache.source("osm", &fragment.sources["osm"]);
	cache.layer(&json!({ "id": "other", "type": "circle" }));
	assert_eq!(cache.stats(), CacheStats { layers: 3, sources: 1 });

	cache.invalidate_fragment(&fragment);
	assert_eq!(cache.stats(), CacheStats { layers: 1, sources: 0 });

	cache.clear();
	assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn cache_is_safe_across_threads() {
	let cache = Arc::new(CapabilityCache::new());
	let handles: Vec<_> = (0..8)
		.map(|i| {
			let cache = Arc::clone(&cache);
			std::thread::spawn(move || {
				for j in 0..50 {
					let layer = json!({ "id": format!("l{}", j % 10), "type": "line", "paint": { "line-opacity": 0.5 } });
					assert_eq!(cache.layer(&layer).opacity, Some(0.5));
					if (i + j) % 7 == 0 {
						cache.invalidate_layer(&layer);
					}
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}
	assert!(cache.stats().layers <= 10);
}
