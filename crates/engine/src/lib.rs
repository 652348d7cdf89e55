//! Layer composition engine.
//!
//! A [`LayerEngine`] owns a collection of [`LayerRecord`]s mirrored into a
//! [`LayerStore`]. Each change resolves the visible records into a
//! [`CompositeSnapshot`]: render order, the top opaque layer, UI hints and
//! the merged style document handed to a renderer.
//!
//! * [`composite`]: ordering and snapshot derivation.
//! * [`accept`]: add/update/reject reconciliation of incoming definitions.
//! * [`sniff`]: recognising transports, styles, GeoJSON, GPX and tile URLs.
//! * [`warnings`]: consistency diagnostics over the snapshot and viewport.

pub mod accept;
pub mod composite;
pub mod config;
pub mod engine;
mod error;
pub mod events;
pub mod offline;
pub mod record;
pub mod sniff;
pub mod store;
pub mod transport;
pub mod warnings;

pub use accept::{AcceptMethod, AcceptMethods, AcceptanceBatch, AcceptanceError, AcceptanceResult};
pub use composite::{CompositeSnapshot, CompositedLayer};
pub use config::{ConfigError, EngineConfig, GroupDef};
pub use engine::{LayerEngine, LayerFilter, QuickToggleOutcome, RecomputeMode, SnapshotReader};
pub use error::{EngineError, Result};
pub use events::{EngineEvent, Subscription};
pub use offline::{OfflinePackContext, ZoomRange};
pub use record::{LayerMetadata, LayerRecord, LayerUserState, UiMode};
pub use sniff::{SniffError, sniff};
pub use store::{LayerStore, MemoryStore, StoreError};
pub use transport::LayerDefinitionTransport;
pub use warnings::{Viewport, Warning};
