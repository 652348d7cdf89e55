//! Turns raw imported bytes into layer definitions.
//!
//! Candidates are tried in a fixed order and the first that parses wins:
//!
//! 1. a non-empty JSON array of transports;
//! 2. a single transport;
//! 3. a bare style document (`version` 8);
//! 4. GeoJSON, split into line, point and polygon sub-layers;
//! 5. GPX with at least one track or waypoint;
//! 6. a tile URL template containing `{z}`, `{x}` and `{y}`, taken from the
//!    source URL.
//!
//! A candidate failing to decode is not an error; only exhausting every
//! candidate is.

mod geometry;
mod track;

use serde::Deserialize;
use serde_json::{Value, json};
use strata_style::{STYLE_VERSION, StyleFragment, json as path};

use crate::config::groups;
use crate::record::LayerMetadata;
use crate::transport::LayerDefinitionTransport;

pub use geometry::is_geojson;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SniffError {
	#[error("could not interpret input")]
	Unrecognized,
}

/// Recognised input format, for logging and callers that want to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	TransportList,
	Transport,
	Style,
	GeoJson,
	Gpx,
	TileUrl,
}

impl Format {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TransportList => "transport-list",
			Self::Transport => "transport",
			Self::Style => "style",
			Self::GeoJson => "geojson",
			Self::Gpx => "gpx",
			Self::TileUrl => "tile-url",
		}
	}
}

/// Interprets `bytes`, optionally fetched from `source_url`.
pub fn sniff(bytes: &[u8], source_url: Option<&str>) -> Result<Vec<LayerDefinitionTransport>, SniffError> {
	let (format, transports) = sniff_format(bytes, source_url)?;
	tracing::debug!(format = format.as_str(), definitions = transports.len(), "sniff.recognised");
	Ok(transports)
}

/// Like [`sniff`], also reporting which candidate matched.
pub fn sniff_format(
	bytes: &[u8],
	source_url: Option<&str>,
) -> Result<(Format, Vec<LayerDefinitionTransport>), SniffError> {
	let name_hint = source_url.and_then(file_stem);

	if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
		if let Some(found) = from_json(&value, name_hint.as_deref()) {
			return Ok(found);
		}
		tracing::trace!("sniff.json_fallthrough");
	}

	if let Some(transport) = track::from_gpx(bytes, name_hint.as_deref()) {
		return Ok((Format::Gpx, vec![transport]));
	}

	if let Some(transport) = source_url.and_then(tile_url) {
		return Ok((Format::TileUrl, vec![transport]));
	}

	tracing::debug!(bytes = bytes.len(), has_url = source_url.is_some(), "sniff.unrecognised");
	Err(SniffError::Unrecognized)
}

fn from_json(value: &Value, name_hint: Option<&str>) -> Option<(Format, Vec<LayerDefinitionTransport>)> {
	if value.is_array()
		&& let Ok(list) = Vec::<LayerDefinitionTransport>::deserialize(value)
		&& !list.is_empty()
		&& list.iter().all(|transport| transport.style.is_supported_version())
	{
		return Some((Format::TransportList, list));
	}
	if let Ok(transport) = LayerDefinitionTransport::deserialize(value)
		&& transport.style.is_supported_version()
	{
		return Some((Format::Transport, vec![transport]));
	}
	if let Some(transport) = raw_style(value, name_hint) {
		return Some((Format::Style, vec![transport]));
	}
	if is_geojson(value) {
		let name = name_hint.unwrap_or("Imported features");
		return geometry::from_geojson(value, name, groups::OVERLAY).map(|t| (Format::GeoJson, vec![t]));
	}
	None
}

fn raw_style(value: &Value, name_hint: Option<&str>) -> Option<LayerDefinitionTransport> {
	if path::get_f64(value, &["version"]) != Some(f64::from(STYLE_VERSION)) {
		return None;
	}
	let style = StyleFragment::deserialize(value).ok()?;
	let name = path::get_str(value, &["name"])
		.or(name_hint)
		.map_or_else(|| format!("Style {}", short_id()), str::to_owned);
	Some(LayerDefinitionTransport::new(
		LayerMetadata::new(generated_id(), name, groups::BASE),
		style,
	))
}

fn tile_url(url: &str) -> Option<LayerDefinitionTransport> {
	if !["{z}", "{x}", "{y}"].iter().all(|token| url.contains(token)) {
		return None;
	}
	let parsed = url::Url::parse(url).ok()?;
	let id = generated_id();
	let source_id = format!("{id}-tiles");
	let mut style = StyleFragment::default();
	style.sources.insert(
		source_id.clone(),
		json!({ "type": "raster", "tiles": [url], "tileSize": 256 }),
	);
	style
		.layers
		.push(json!({ "id": format!("{id}-raster"), "type": "raster", "source": source_id }));
	let name = parsed.host_str().unwrap_or("Tiles").to_owned();
	let mut metadata = LayerMetadata::new(id, name, groups::BASE);
	metadata.attribution = parsed.host_str().map(str::to_owned);
	Some(LayerDefinitionTransport::new(metadata, style))
}

fn generated_id() -> String {
	uuid::Uuid::new_v4().to_string()
}

fn short_id() -> String {
	generated_id().chars().take(8).collect()
}

/// Last path segment of a URL or file path, without its extension.
fn file_stem(source: &str) -> Option<String> {
	let path = source.split(['?', '#']).next()?;
	let segment = path.rsplit(['/', '\\']).next()?;
	let stem = segment.split_once('.').map_or(segment, |(stem, _)| stem);
	(!stem.is_empty() && !stem.contains('{')).then(|| stem.to_owned())
}
