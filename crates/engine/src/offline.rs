//! Metadata attached to an externally managed offline download.
//!
//! ```json
//! { "layerIds": ["osm"], "bounds": { "sw": [-1, 51], "ne": [2, 53] },
//!   "name": "Weekend", "zoom": { "from": 8, "to": 14 } }
//! ```

use serde::{Deserialize, Serialize};
use strata_style::BoundingBox;

use crate::composite::CompositeSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
	pub from: f64,
	pub to: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflinePackContext {
	pub layer_ids: Vec<String>,
	pub bounds: BoundingBox,
	pub name: String,
	pub zoom: ZoomRange,
}

impl OfflinePackContext {
	/// Context for downloading what is currently revealed.
	pub fn from_snapshot(snapshot: &CompositeSnapshot, name: impl Into<String>, bounds: BoundingBox, zoom: ZoomRange) -> Self {
		Self {
			layer_ids: snapshot.revealed.iter().map(|record| record.id().to_owned()).collect(),
			bounds,
			name: name.into(),
			zoom,
		}
	}

	pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}

	pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
		serde_json::from_slice(bytes)
	}
}
