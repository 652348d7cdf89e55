//! Engine configuration: group ordering, merge behaviour and warning tuning.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! hoist_symbol_layers = true
//! warning_debounce_ms = 100
//! min_zoom_tolerance = 2.5
//!
//! [[groups]]
//! id = "overlay"
//! name = "Overlays"
//! never_opaque = true
//! dark_ui = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strata_style::MergeOptions;

/// Well-known group ids.
pub mod groups {
	pub const OVERLAY: &str = "overlay";
	pub const TRACKS: &str = "tracks";
	pub const AERIAL: &str = "aerial";
	pub const BASE: &str = "base";
	pub const OTHER: &str = "other";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// One layer category, in render-priority order within [`EngineConfig::groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
	pub id: String,
	pub name: String,
	/// Layers in this group are always treated as transparent.
	#[serde(default)]
	pub never_opaque: bool,
	/// Dark interface chrome suits this group when it is on top.
	#[serde(default)]
	pub dark_ui: bool,
}

impl GroupDef {
	fn new(id: &str, name: &str, never_opaque: bool, dark_ui: bool) -> Self {
		Self {
			id: id.to_owned(),
			name: name.to_owned(),
			never_opaque,
			dark_ui,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Earlier groups sort first (render on top).
	pub groups: Vec<GroupDef>,
	pub hoist_symbol_layers: bool,
	pub warning_debounce_ms: u64,
	/// Zoom levels below the composited minimum before warning.
	pub min_zoom_tolerance: f64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			groups: vec![
				GroupDef::new(groups::OVERLAY, "Overlays", true, true),
				GroupDef::new(groups::TRACKS, "Tracks", true, false),
				GroupDef::new(groups::AERIAL, "Aerial", false, true),
				GroupDef::new(groups::BASE, "Base maps", false, false),
				GroupDef::new(groups::OTHER, "Other", false, false),
			],
			hoist_symbol_layers: true,
			warning_debounce_ms: 100,
			min_zoom_tolerance: 2.5,
		}
	}
}

impl EngineConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_owned(),
			source,
		})?;
		Self::from_toml_str(&input)
	}

	pub fn group(&self, id: &str) -> Option<&GroupDef> {
		self.groups.iter().find(|group| group.id == id)
	}

	/// Position of `id` in the group list; unknown groups rank after all
	/// configured ones.
	pub fn group_rank(&self, id: &str) -> usize {
		self.groups.iter().position(|group| group.id == id).unwrap_or(self.groups.len())
	}

	pub fn is_never_opaque(&self, id: &str) -> bool {
		self.group(id).is_some_and(|group| group.never_opaque)
	}

	pub fn prefers_dark_ui(&self, id: &str) -> bool {
		self.group(id).is_some_and(|group| group.dark_ui)
	}

	pub fn merge_options(&self) -> MergeOptions {
		MergeOptions {
			hoist_symbols: self.hoist_symbol_layers,
		}
	}

	pub fn warning_debounce(&self) -> Duration {
		Duration::from_millis(self.warning_debounce_ms)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
	}

	#[test]
	fn partial_document_overrides_fields() {
		let config = EngineConfig::from_toml_str(
			r#"
			hoist_symbol_layers = false

			[[groups]]
			id = "base"
			name = "Base"

			[[groups]]
			id = "overlay"
			name = "Overlays"
			never_opaque = true
			"#,
		)
		.unwrap();
		assert!(!config.hoist_symbol_layers);
		assert_eq!(config.warning_debounce(), Duration::from_millis(100));
		assert_eq!(config.group_rank("base"), 0);
		assert_eq!(config.group_rank("overlay"), 1);
		assert_eq!(config.group_rank("unknown"), 2);
		assert!(config.is_never_opaque("overlay"));
		assert!(!config.prefers_dark_ui("overlay"));
	}

	#[test]
	fn rejects_malformed_documents() {
		assert!(matches!(
			EngineConfig::from_toml_str("groups = 3"),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "min_zoom_tolerance = 1.0").unwrap();
		let config = EngineConfig::load(file.path()).unwrap();
		assert_eq!(config.min_zoom_tolerance, 1.0);

		let missing = EngineConfig::load(Path::new("/nonexistent/strata.toml"));
		assert!(matches!(missing, Err(ConfigError::Read { .. })));
	}
}
