use std::sync::Arc;

use strata_style::StyleFragment;

use super::LayerEngine;
use crate::accept::{AcceptMethod, AcceptMethods, AcceptanceBatch, AcceptanceResult, Placement, place};
use crate::error::Result;
use crate::record::{LayerMetadata, LayerRecord, LayerUserState};
use crate::sniff::sniff;
use crate::store::LayerStore;
use crate::transport::LayerDefinitionTransport;

impl<S: LayerStore> LayerEngine<S> {
	/// Inserts a new hidden layer. An empty `metadata.id` is replaced with a
	/// store-generated one.
	pub fn add(&mut self, mut metadata: LayerMetadata, style: StyleFragment) -> Result<Arc<LayerRecord>> {
		if metadata.id.is_empty() {
			metadata.id = self.store.generate_id();
		}
		let record = self.insert(metadata, style, None)?;
		self.save()?;
		Ok(record)
	}

	pub fn remove(&mut self, id: &str) -> Result<Arc<LayerRecord>> {
		let index = self.require(id)?;
		self.cache.invalidate_fragment(&self.layers[index].style);
		self.store
			.delete(id)
			.inspect_err(|error| tracing::warn!(%error, id, "store.delete_failed"))?;
		let removed = self.layers.remove(index);
		if let Some(memory) = &mut self.quick_toggle_memory {
			memory.retain(|remembered| remembered != id);
		}
		self.save()?;
		Ok(removed)
	}

	/// Reconciles a single definition; see [`accept_batch`](Self::accept_batch).
	pub fn accept(
		&mut self,
		definition: LayerDefinitionTransport,
		methods: &AcceptMethods,
	) -> Result<AcceptanceResult> {
		let mut batch = self.accept_batch(vec![definition], methods)?;
		Ok(batch.results.remove(0))
	}

	/// Reconciles each definition in order, committing once if anything was
	/// accepted. A batch of exactly one newly added definition is also shown.
	pub fn accept_batch(
		&mut self,
		definitions: Vec<LayerDefinitionTransport>,
		methods: &AcceptMethods,
	) -> Result<AcceptanceBatch> {
		let mut batch = AcceptanceBatch::default();
		for definition in definitions {
			let result = self.accept_one(definition, methods)?;
			batch.results.push(result);
		}

		if let [AcceptanceResult::Accepted {
			method: AcceptMethod::Add,
			layer,
		}] = batch.results.as_mut_slice()
		{
			let index = self.require(layer.id())?;
			self.reveal(index)?;
			*layer = Arc::clone(&self.layers[index]);
		}

		if batch.results.iter().any(AcceptanceResult::is_accepted) {
			self.save()?;
		}
		tracing::info!(
			added = batch.added().len(),
			updated = batch.updated().len(),
			rejected = batch.rejected().len(),
			"accept.batch"
		);
		Ok(batch)
	}

	/// Sniffs `bytes` and accepts whatever they contain with the default methods.
	pub fn import(&mut self, bytes: &[u8], source_url: Option<&str>) -> Result<AcceptanceBatch> {
		let definitions = sniff(bytes, source_url)?;
		self.accept_batch(definitions, &AcceptMethods::default())
	}

	/// The shareable form of a layer, without user state.
	pub fn export(&self, id: &str) -> Result<LayerDefinitionTransport> {
		let index = self.require(id)?;
		Ok(LayerDefinitionTransport::export(&self.layers[index]))
	}

	fn accept_one(&mut self, definition: LayerDefinitionTransport, methods: &AcceptMethods) -> Result<AcceptanceResult> {
		let placement = place(methods, definition.id(), |id| self.index_of(id));
		let (method, placement) = match placement {
			Ok(found) => found,
			Err(error) => {
				tracing::info!(id = definition.id(), %error, "accept.rejected");
				return Ok(AcceptanceResult::Rejected(error));
			}
		};
		tracing::info!(id = definition.id(), ?method, "accept.accepted");

		let LayerDefinitionTransport { metadata, user, style } = definition;
		let layer = match placement {
			Placement::Insert => self.insert(metadata, style, user)?,
			Placement::Overwrite(index) => {
				self.cache.invalidate_fragment(&self.layers[index].style);
				let previous_id = self.layers[index].id().to_owned();
				let record = self.modify(index, |record| {
					record.metadata = metadata;
					record.style = style;
					if let Some(user) = user {
						record.user = user;
					}
				})?;
				if previous_id != record.id()
					&& let Some(memory) = &mut self.quick_toggle_memory
				{
					for remembered in memory.iter_mut().filter(|remembered| **remembered == previous_id) {
						record.id().clone_into(remembered);
					}
				}
				record
			}
		};
		Ok(AcceptanceResult::Accepted { method, layer })
	}

	fn insert(
		&mut self,
		metadata: LayerMetadata,
		style: StyleFragment,
		user: Option<LayerUserState>,
	) -> Result<Arc<LayerRecord>> {
		let id = metadata.id.clone();
		let mut record = self
			.store
			.insert(style, metadata)
			.inspect_err(|error| tracing::warn!(%error, id = id.as_str(), "store.insert_failed"))?;
		if let Some(user) = user {
			record.user = user;
			self.store.update(&id, &record)?;
		}
		let record = Arc::new(record);
		self.layers.push(Arc::clone(&record));
		Ok(record)
	}
}
