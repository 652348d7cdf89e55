//! Persisted layer records.

use serde::{Deserialize, Serialize};
use strata_style::StyleFragment;

/// Explicit light/dark chrome preference for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
	Dark,
	Light,
}

/// Identity and descriptive fields of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadata {
	pub id: String,
	pub name: String,
	/// Category id, matched against the configured group list.
	pub group: String,
	#[serde(rename = "overrideUIMode", default, skip_serializing_if = "Option::is_none")]
	pub override_ui_mode: Option<UiMode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub attribution: Option<String>,
}

impl LayerMetadata {
	pub fn new(id: impl Into<String>, name: impl Into<String>, group: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			group: group.into(),
			override_ui_mode: None,
			attribution: None,
		}
	}
}

/// User-curated state that travels with a layer definition on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerUserState {
	#[serde(default)]
	pub group_index: i64,
	#[serde(default)]
	pub pinned: bool,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	#[serde(default)]
	pub quick_toggle: bool,
}

fn enabled_by_default() -> bool {
	true
}

impl Default for LayerUserState {
	fn default() -> Self {
		Self {
			group_index: 0,
			pinned: false,
			enabled: true,
			quick_toggle: false,
		}
	}
}

/// One user-manageable map layer and the style fragment it contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
	pub metadata: LayerMetadata,
	pub user: LayerUserState,
	pub visible: bool,
	pub style: StyleFragment,
}

impl LayerRecord {
	/// A hidden, enabled record with default user state.
	pub fn new(metadata: LayerMetadata, style: StyleFragment) -> Self {
		Self {
			metadata,
			user: LayerUserState::default(),
			visible: false,
			style,
		}
	}

	pub fn id(&self) -> &str {
		&self.metadata.id
	}

	pub fn name(&self) -> &str {
		&self.metadata.name
	}

	pub fn group(&self) -> &str {
		&self.metadata.group
	}
}
