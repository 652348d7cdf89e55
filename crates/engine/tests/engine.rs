//! End-to-end behaviour of the layer engine through its public API.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;
use strata_engine::{
	AcceptMethods, EngineConfig, EngineEvent, LayerDefinitionTransport, LayerEngine, LayerMetadata, MemoryStore,
	RecomputeMode,
};

fn definitions() -> Vec<LayerDefinitionTransport> {
	serde_json::from_value(json!([
		{
			"metadata": { "id": "osm", "name": "OpenStreetMap", "group": "base" },
			"user": { "groupIndex": 0 },
			"style": {
				"version": 8,
				"sources": {
					"osm": { "type": "raster", "tiles": ["https://tile.example/{z}/{x}/{y}.png"], "tileSize": 256 },
					"shared": { "type": "vector", "url": "https://tiles.example/base.json" }
				},
				"layers": [
					{ "id": "osm", "type": "raster", "source": "osm" },
					{ "id": "osm-labels", "type": "symbol", "source": "shared", "layout": { "text-field": "{name}" } }
				],
				"glyphs": "https://fonts.example/base/{fontstack}/{range}.pbf"
			}
		},
		{
			"metadata": { "id": "hike", "name": "Hiking", "group": "overlay" },
			"style": {
				"version": 8,
				"sources": { "shared": { "type": "vector", "url": "https://tiles.example/hike.json" } },
				"layers": [
					{ "id": "hike-paths", "type": "line", "source": "shared", "paint": { "line-color": "#c03" } }
				],
				"glyphs": "https://fonts.example/hike/{fontstack}/{range}.pbf"
			}
		}
	]))
	.unwrap()
}

fn show_all(engine: &mut LayerEngine<MemoryStore>) {
	engine.show("osm").unwrap();
	engine.show("hike").unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_recompute_publishes_on_apply() {
	let mut engine = LayerEngine::open(MemoryStore::new(), EngineConfig::default()).unwrap();
	let published = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&published);
	engine.subscribe(move |event| {
		if let EngineEvent::SnapshotChanged(snapshot) = event {
			sink.lock().unwrap().push(snapshot.version);
		}
	});

	let batch = engine.accept_batch(definitions(), &AcceptMethods::default()).unwrap();
	assert_eq!(batch.added().len(), 2);
	show_all(&mut engine);

	// Nothing is visible to readers until the results are applied.
	let reader = engine.snapshot_reader();
	assert_eq!(reader.load().version, 0);

	let snapshot = engine.settle().await.unwrap();
	assert_eq!(snapshot.version, 3);
	assert_eq!(snapshot.sorted_ids(), vec!["hike", "osm"]);
	assert_eq!(reader.load().version, 3);
	assert_eq!(*published.lock().unwrap(), vec![3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_generations_are_dropped() {
	let mut engine = LayerEngine::open(MemoryStore::new(), EngineConfig::default()).unwrap();
	engine.accept_batch(definitions(), &AcceptMethods::default()).unwrap();
	let newest = engine.request_recompute();
	newest.await.unwrap();
	assert_eq!(engine.apply_pending().map(|s| s.version), Some(2));

	let inline = engine.recompute_now();
	assert_eq!(inline.version, 3);
	engine.settle().await;
	assert_eq!(engine.snapshot().version, 3);
	assert_eq!(engine.apply_pending().map(|s| s.version), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn merged_document_is_deterministic() {
	let mut outputs = Vec::new();
	for _ in 0..2 {
		let mut engine = LayerEngine::open(MemoryStore::new(), EngineConfig::default()).unwrap();
		engine.accept_batch(definitions(), &AcceptMethods::default()).unwrap();
		show_all(&mut engine);
		let snapshot = engine.settle().await.unwrap();
		outputs.push(serde_json::to_vec(&snapshot.style).unwrap());
	}
	assert_eq!(outputs[0], outputs[1]);

	let merged: serde_json::Value = serde_json::from_slice(&outputs[0]).unwrap();
	// Top layer wins the shared source; the bottom layer keeps its glyphs.
	assert_eq!(merged["sources"]["shared"]["url"], json!("https://tiles.example/hike.json"));
	assert_eq!(merged["glyphs"], json!("https://fonts.example/base/{fontstack}/{range}.pbf"));
	let ids: Vec<_> = merged["layers"]
		.as_array()
		.unwrap()
		.iter()
		.map(|layer| layer["id"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["osm", "hike-paths", "osm-labels"]);
}

#[test]
fn single_import_is_revealed_and_persisted_once() {
	let mut engine = LayerEngine::open(MemoryStore::new(), EngineConfig::default())
		.unwrap()
		.with_recompute_mode(RecomputeMode::Inline);
	let bytes = serde_json::to_vec(&json!({
		"type": "Feature",
		"properties": { "name": "Summit" },
		"geometry": { "type": "Point", "coordinates": [7.65, 45.97] }
	}))
	.unwrap();

	let batch = engine.import(&bytes, Some("https://example.org/summit.geojson")).unwrap();
	let added = batch.added()[0];
	assert_eq!(added.name(), "summit");
	assert!(engine.layer(added.id()).unwrap().visible);
	assert_eq!(engine.store().save_count(), 1);
	assert_eq!(engine.snapshot().layers.len(), 1);
}

#[test]
fn exported_definition_reimports_as_update() {
	let mut engine = LayerEngine::open(MemoryStore::new(), EngineConfig::default())
		.unwrap()
		.with_recompute_mode(RecomputeMode::Inline);
	engine
		.add(LayerMetadata::new("mine", "Mine", "other"), Default::default())
		.unwrap();
	let exported = engine.export("mine").unwrap().to_json().unwrap();

	let batch = engine.import(exported.as_bytes(), None).unwrap();
	assert_eq!(batch.updated().len(), 1);
	assert_eq!(engine.layers().len(), 1);
}
