use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::*;

fn fragment(value: Value) -> StyleFragment {
	serde_json::from_value(value).unwrap()
}

fn layer_ids(style: &StyleFragment) -> Vec<&str> {
	style.layers.iter().filter_map(crate::fragment::layer_id).collect()
}

#[test]
fn top_fragment_wins_source_collisions() {
	let bottom = fragment(json!({
		"version": 8,
		"sources": { "x": { "type": "vector", "url": "bottom" }, "b": { "type": "raster" } },
		"layers": []
	}));
	let top = fragment(json!({
		"version": 8,
		"sources": { "x": { "type": "vector", "url": "top" } },
		"layers": []
	}));

	let merged = merge([&top, &bottom], MergeOptions::default());
	assert_eq!(merged.sources["x"], json!({ "type": "vector", "url": "top" }));
	assert_eq!(merged.sources.len(), 2);
	assert_eq!(merged.version, 8);
}

#[test]
fn layers_stack_bottom_up() {
	let base = fragment(json!({
		"version": 8, "sources": {},
		"layers": [{ "id": "land", "type": "fill" }, { "id": "place", "type": "symbol" }]
	}));
	let overlay = fragment(json!({
		"version": 8, "sources": {},
		"layers": [{ "id": "route", "type": "line" }]
	}));

	let plain = merge([&overlay, &base], MergeOptions::default());
	assert_eq!(layer_ids(&plain), ["land", "place", "route"]);

	let hoisted = merge([&overlay, &base], MergeOptions { hoist_symbols: true });
	assert_eq!(layer_ids(&hoisted), ["land", "route", "place"]);
}

#[test]
fn hoisted_symbols_keep_relative_order() {
	let lower = fragment(json!({
		"version": 8, "sources": {},
		"layers": [{ "id": "a-label", "type": "symbol" }, { "id": "a-fill", "type": "fill" }]
	}));
	let upper = fragment(json!({
		"version": 8, "sources": {},
		"layers": [{ "id": "b-label", "type": "symbol" }, { "id": "b-fill", "type": "fill" }]
	}));
	let merged = merge([&upper, &lower], MergeOptions { hoist_symbols: true });
	assert_eq!(layer_ids(&merged), ["a-fill", "b-fill", "a-label", "b-label"]);
}

#[test]
fn lowest_defined_resources_win() {
	let lowest = fragment(json!({
		"version": 8, "sources": {}, "layers": [],
		"glyphs": "glyphs://low"
	}));
	let middle = fragment(json!({
		"version": 8, "sources": {}, "layers": [],
		"sprite": "sprite://middle",
		"terrain": { "source": "dem" }
	}));
	let top = fragment(json!({
		"version": 8, "sources": {}, "layers": [],
		"sprite": "sprite://top",
		"glyphs": "glyphs://top"
	}));

	let merged = merge([&top, &middle, &lowest], MergeOptions::default());
	assert_eq!(merged.glyphs.as_deref(), Some("glyphs://low"));
	assert_eq!(merged.sprite, Some(json!("sprite://middle")));
	assert_eq!(merged.terrain, Some(json!({ "source": "dem" })));
}

#[test]
fn empty_input_yields_empty_document() {
	let merged = merge(std::iter::empty::<&StyleFragment>(), MergeOptions { hoist_symbols: true });
	assert_eq!(merged, StyleFragment::default());
}

#[test]
fn output_is_byte_stable() {
	let a = fragment(json!({
		"version": 8,
		"sources": { "s1": { "type": "vector" }, "s2": { "type": "raster" } },
		"layers": [{ "id": "one", "type": "fill" }]
	}));
	let b = fragment(json!({
		"version": 8,
		"sources": { "s3": { "type": "geojson", "data": { "type": "FeatureCollection", "features": [] } } },
		"layers": [{ "id": "two", "type": "line" }]
	}));
	let first = serde_json::to_vec(&merge([&a, &b], MergeOptions::default())).unwrap();
	let second = serde_json::to_vec(&merge([&a, &b], MergeOptions::default())).unwrap();
	assert_eq!(first, second);
}
