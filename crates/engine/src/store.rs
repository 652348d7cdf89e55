//! Persistence contract for layer records.
//!
//! The engine owns the live collection; a [`LayerStore`] only mirrors it.
//! Writes are staged until [`LayerStore::save`] commits them.

use crate::record::{LayerMetadata, LayerRecord};
use strata_style::StyleFragment;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	#[error("no stored layer with id {0:?}")]
	NotFound(String),
	#[error("a stored layer already has id {0:?}")]
	DuplicateId(String),
	#[error("layer store backend failure: {0}")]
	Backend(String),
}

pub trait LayerStore: Send {
	/// Every committed record.
	fn fetch_all(&self) -> Result<Vec<LayerRecord>, StoreError>;

	/// Stages a new hidden record with default user state.
	fn insert(&mut self, style: StyleFragment, metadata: LayerMetadata) -> Result<LayerRecord, StoreError>;

	/// Stages an overwrite of the record currently stored as `previous_id`.
	/// The record's own id may differ when an edit renamed it.
	fn update(&mut self, previous_id: &str, record: &LayerRecord) -> Result<(), StoreError>;

	fn delete(&mut self, id: &str) -> Result<(), StoreError>;

	/// Commits staged writes.
	fn save(&mut self) -> Result<(), StoreError>;

	/// Stable, globally unique id for a new record.
	fn generate_id(&self) -> String {
		uuid::Uuid::new_v4().to_string()
	}
}

/// In-process store; commits copy the staged collection.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
	staged: Vec<LayerRecord>,
	committed: Vec<LayerRecord>,
	saves: usize,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A store whose committed state is `records`.
	pub fn with_records(records: Vec<LayerRecord>) -> Self {
		Self {
			staged: records.clone(),
			committed: records,
			saves: 0,
		}
	}

	/// Number of successful commits.
	pub fn save_count(&self) -> usize {
		self.saves
	}

	pub fn committed(&self) -> &[LayerRecord] {
		&self.committed
	}

	fn position(&self, id: &str) -> Option<usize> {
		self.staged.iter().position(|record| record.id() == id)
	}
}

impl LayerStore for MemoryStore {
	fn fetch_all(&self) -> Result<Vec<LayerRecord>, StoreError> {
		Ok(self.committed.clone())
	}

	fn insert(&mut self, style: StyleFragment, metadata: LayerMetadata) -> Result<LayerRecord, StoreError> {
		if self.position(&metadata.id).is_some() {
			return Err(StoreError::DuplicateId(metadata.id));
		}
		let record = LayerRecord::new(metadata, style);
		self.staged.push(record.clone());
		Ok(record)
	}

	fn update(&mut self, previous_id: &str, record: &LayerRecord) -> Result<(), StoreError> {
		let index = self
			.position(previous_id)
			.ok_or_else(|| StoreError::NotFound(previous_id.to_owned()))?;
		if record.id() != previous_id && self.position(record.id()).is_some() {
			return Err(StoreError::DuplicateId(record.id().to_owned()));
		}
		self.staged[index] = record.clone();
		Ok(())
	}

	fn delete(&mut self, id: &str) -> Result<(), StoreError> {
		let index = self.position(id).ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
		self.staged.remove(index);
		Ok(())
	}

	fn save(&mut self) -> Result<(), StoreError> {
		self.committed.clone_from(&self.staged);
		self.saves += 1;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn metadata(id: &str) -> LayerMetadata {
		LayerMetadata::new(id, id.to_uppercase(), "base")
	}

	#[test]
	fn writes_are_staged_until_save() {
		let mut store = MemoryStore::new();
		store.insert(StyleFragment::default(), metadata("a")).unwrap();
		assert!(store.fetch_all().unwrap().is_empty());

		store.save().unwrap();
		assert_eq!(store.fetch_all().unwrap().len(), 1);
		assert_eq!(store.save_count(), 1);
	}

	#[test]
	fn rejects_duplicate_and_missing_ids() {
		let mut store = MemoryStore::new();
		let record = store.insert(StyleFragment::default(), metadata("a")).unwrap();
		assert_eq!(
			store.insert(StyleFragment::default(), metadata("a")),
			Err(StoreError::DuplicateId("a".to_owned()))
		);
		assert_eq!(store.delete("zzz"), Err(StoreError::NotFound("zzz".to_owned())));
		assert_eq!(store.update("zzz", &record), Err(StoreError::NotFound("zzz".to_owned())));
	}

	#[test]
	fn update_can_rename() {
		let mut store = MemoryStore::new();
		let mut record = store.insert(StyleFragment::default(), metadata("a")).unwrap();
		store.insert(StyleFragment::default(), metadata("b")).unwrap();

		record.metadata.id = "b".to_owned();
		assert_eq!(store.update("a", &record), Err(StoreError::DuplicateId("b".to_owned())));

		record.metadata.id = "c".to_owned();
		store.update("a", &record).unwrap();
		store.save().unwrap();
		let ids: Vec<_> = store.committed().iter().map(|r| r.id().to_owned()).collect();
		assert_eq!(ids, ["c", "b"]);
	}

	#[test]
	fn generated_ids_are_unique() {
		let store = MemoryStore::new();
		assert_ne!(store.generate_id(), store.generate_id());
	}
}
