//! Reconciles incoming layer definitions against the collection.
//!
//! [`place`] is the pure decision: given the methods to try and a lookup
//! into the current collection it picks where an incoming id lands. The
//! engine applies the placement and persists once per batch.

use std::sync::Arc;

use crate::record::LayerRecord;

/// How an incoming definition may be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptMethod {
	/// Overwrite the caller-supplied target, keeping its position and visibility.
	UpdateRequiredLayer,
	/// Overwrite the layer that already has the incoming id.
	UpdateMatchingId,
	/// Insert a new record.
	Add,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcceptanceError {
	#[error("a layer with id {0:?} already exists")]
	LayerExistsWithId(String),
	#[error("no layer with id {0:?} exists")]
	NoLayerExistsWithId(String),
	/// Reserved for updates that would clobber populated user data.
	#[error("layer {0:?} already contains data")]
	ExistingLayerContainsData(String),
	#[error("no acceptance method applied")]
	Unexplained,
}

/// Ordered acceptance methods plus the optional target for
/// [`AcceptMethod::UpdateRequiredLayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptMethods {
	methods: Vec<AcceptMethod>,
	required: Option<String>,
}

impl Default for AcceptMethods {
	/// Update a layer with the same id, otherwise add.
	fn default() -> Self {
		Self::custom([AcceptMethod::UpdateMatchingId, AcceptMethod::Add], None)
	}
}

impl AcceptMethods {
	/// Always add; an existing id is an error.
	pub fn new_only() -> Self {
		Self::custom([AcceptMethod::Add], None)
	}

	/// Overwrite `target` in place, whatever the incoming id.
	pub fn edit(target: impl Into<String>) -> Self {
		Self::custom([AcceptMethod::UpdateRequiredLayer], Some(target.into()))
	}

	pub fn custom(methods: impl IntoIterator<Item = AcceptMethod>, required: Option<String>) -> Self {
		Self {
			methods: methods.into_iter().collect(),
			required,
		}
	}

	pub fn methods(&self) -> &[AcceptMethod] {
		&self.methods
	}

	pub fn required(&self) -> Option<&str> {
		self.required.as_deref()
	}
}

/// Where an accepted definition goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	/// Overwrite the record at this index of the collection.
	Overwrite(usize),
	Insert,
}

/// Tries `methods` in order for a definition with `incoming_id`.
///
/// `index_of` looks up a collection index by layer id. All failing yields the
/// last error seen, or [`AcceptanceError::Unexplained`] if no method applied.
pub fn place(
	methods: &AcceptMethods,
	incoming_id: &str,
	index_of: impl Fn(&str) -> Option<usize>,
) -> Result<(AcceptMethod, Placement), AcceptanceError> {
	let mut last_error = None;
	for &method in methods.methods() {
		let attempt = match method {
			AcceptMethod::UpdateRequiredLayer => {
				let Some(target) = methods.required() else {
					continue;
				};
				match (index_of(target), index_of(incoming_id)) {
					(None, _) => Err(AcceptanceError::NoLayerExistsWithId(target.to_owned())),
					(Some(target_index), Some(existing)) if existing != target_index => {
						Err(AcceptanceError::LayerExistsWithId(incoming_id.to_owned()))
					}
					(Some(target_index), _) => Ok(Placement::Overwrite(target_index)),
				}
			}
			AcceptMethod::UpdateMatchingId => index_of(incoming_id)
				.map(Placement::Overwrite)
				.ok_or_else(|| AcceptanceError::NoLayerExistsWithId(incoming_id.to_owned())),
			AcceptMethod::Add => match index_of(incoming_id) {
				Some(_) => Err(AcceptanceError::LayerExistsWithId(incoming_id.to_owned())),
				None => Ok(Placement::Insert),
			},
		};
		match attempt {
			Ok(placement) => return Ok((method, placement)),
			Err(error) => last_error = Some(error),
		}
	}
	Err(last_error.unwrap_or(AcceptanceError::Unexplained))
}

/// Outcome for one submitted definition.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptanceResult {
	Accepted { method: AcceptMethod, layer: Arc<LayerRecord> },
	Rejected(AcceptanceError),
}

impl AcceptanceResult {
	pub fn is_accepted(&self) -> bool {
		matches!(self, Self::Accepted { .. })
	}

	pub fn layer(&self) -> Option<&Arc<LayerRecord>> {
		match self {
			Self::Accepted { layer, .. } => Some(layer),
			Self::Rejected(_) => None,
		}
	}
}

/// Results of one batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptanceBatch {
	pub results: Vec<AcceptanceResult>,
}

impl AcceptanceBatch {
	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	/// Newly inserted layers.
	pub fn added(&self) -> Vec<&Arc<LayerRecord>> {
		self.accepted_where(|method| method == AcceptMethod::Add)
	}

	/// Layers overwritten in place.
	pub fn updated(&self) -> Vec<&Arc<LayerRecord>> {
		self.accepted_where(|method| method != AcceptMethod::Add)
	}

	pub fn rejected(&self) -> Vec<&AcceptanceError> {
		self.results
			.iter()
			.filter_map(|result| match result {
				AcceptanceResult::Rejected(error) => Some(error),
				AcceptanceResult::Accepted { .. } => None,
			})
			.collect()
	}

	fn accepted_where(&self, keep: impl Fn(AcceptMethod) -> bool) -> Vec<&Arc<LayerRecord>> {
		self.results
			.iter()
			.filter_map(|result| match result {
				AcceptanceResult::Accepted { method, layer } if keep(*method) => Some(layer),
				_ => None,
			})
			.collect()
	}
}
