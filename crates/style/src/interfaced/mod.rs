//! Typed, editable capability views derived from raw style JSON.
//!
//! # Mental model
//!
//! * An [`InterfacedLayer`] answers "what colour / opacity does this style
//!   layer paint with" through a fixed per-type property table.
//! * An [`InterfacedSource`] answers "over which zooms and where does this
//!   source have data".
//! * Both are pure functions of the raw JSON, so [`CapabilityCache`] can key
//!   them by content hash and share them between the background recompute
//!   and foreground edits.
//!
//! # Invariants
//!
//! * A cache entry is removed before the raw content it was derived from is
//!   mutated. Callers that edit raw layers or sources go through
//!   [`CapabilityCache::invalidate_layer`] / [`CapabilityCache::invalidate_source`]
//!   first.
//! * A resolved colour's alpha always equals the resolved opacity.

mod cache;
mod layer;
mod source;

pub use cache::{CacheStats, CapabilityCache};
pub use layer::{InterfacedLayer, LayerCapabilities};
pub use source::{GeoData, InterfacedSource, SourceCapabilities, geometry_bounds};

#[cfg(test)]
mod tests;
