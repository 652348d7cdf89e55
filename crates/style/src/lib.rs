//! Style-document building blocks for strata.
//!
//! * [`fragment`]: the per-layer [`StyleFragment`] and its type discriminants.
//! * [`json`]: explicit path helpers over untyped style JSON.
//! * [`colour`] and [`geo`]: value types shared by capability views.
//! * [`interfaced`]: derived colour/opacity/zoom/bounds views and their cache.
//! * [`merge`]: folds render-ordered fragments into one style document.

pub mod colour;
pub mod fragment;
pub mod geo;
pub mod interfaced;
pub mod json;
pub mod merge;

pub use colour::Rgba;
pub use fragment::{LayerKind, STYLE_VERSION, SourceKind, StyleFragment, layer_id};
pub use geo::{BoundingBox, LngLat};
pub use interfaced::{
	CacheStats, CapabilityCache, GeoData, InterfacedLayer, InterfacedSource, LayerCapabilities,
	SourceCapabilities,
};
pub use json::PathError;
pub use merge::{MergeOptions, merge};
