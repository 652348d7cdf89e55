use strata_style::PathError;

use crate::accept::AcceptanceError;
use crate::sniff::SniffError;
use crate::store::StoreError;

/// Failure of a [`LayerEngine`](crate::LayerEngine) operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error(transparent)]
	Sniff(#[from] SniffError),
	#[error(transparent)]
	Acceptance(#[from] AcceptanceError),
	#[error(transparent)]
	Path(#[from] PathError),
	#[error("no layer with id {0:?}")]
	UnknownLayer(String),
	#[error("layer {layer:?} has no style layer {sublayer:?}")]
	UnknownSublayer { layer: String, sublayer: String },
	#[error("layer {layer:?} has no source {source_id:?}")]
	UnknownSource { layer: String, source_id: String },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
