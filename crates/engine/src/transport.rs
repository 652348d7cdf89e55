//! Import/export representation of a layer definition.
//!
//! ```json
//! { "metadata": { "id", "name", "group", "overrideUIMode"?, "attribution"? },
//!   "user": { "groupIndex", "pinned", "enabled", "quickToggle" }?,
//!   "style": { "version", "sources", "layers", "sprite"?, "glyphs"?, "terrain"? } }
//! ```
//!
//! Missing `user` fields decode to their defaults (`enabled = true`, the rest
//! zero/false). Exports omit `user` entirely.

use serde::{Deserialize, Serialize};
use strata_style::StyleFragment;

use crate::record::{LayerMetadata, LayerRecord, LayerUserState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinitionTransport {
	pub metadata: LayerMetadata,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<LayerUserState>,
	pub style: StyleFragment,
}

impl LayerDefinitionTransport {
	pub fn new(metadata: LayerMetadata, style: StyleFragment) -> Self {
		Self {
			metadata,
			user: None,
			style,
		}
	}

	/// Export form of a record: metadata and style, no user state.
	pub fn export(record: &LayerRecord) -> Self {
		Self {
			metadata: record.metadata.clone(),
			user: None,
			style: record.style.clone(),
		}
	}

	/// Full form of a record, including user state.
	pub fn snapshot(record: &LayerRecord) -> Self {
		Self {
			user: Some(record.user),
			..Self::export(record)
		}
	}

	pub fn id(&self) -> &str {
		&self.metadata.id
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}

	pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
		serde_json::from_slice(bytes)
	}
}
