use std::sync::Arc;

use strata_style::BoundingBox;

use super::LayerEngine;
use crate::error::Result;
use crate::record::LayerRecord;
use crate::store::LayerStore;

/// Result of [`LayerEngine::quick_toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickToggleOutcome {
	/// Layers hidden or shown.
	pub count: usize,
	/// `true` when layers were shown again, `false` when they were hidden.
	pub restore: bool,
}

/// Conjunctive record filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerFilter {
	pub group: Option<String>,
	pub visible: Option<bool>,
	pub enabled: Option<bool>,
	pub pinned: Option<bool>,
	pub quick_toggle: Option<bool>,
	/// Case-insensitive substring of the name.
	pub name_contains: Option<String>,
}

impl LayerFilter {
	pub fn group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn visible(mut self, visible: bool) -> Self {
		self.visible = Some(visible);
		self
	}

	pub fn pinned(mut self, pinned: bool) -> Self {
		self.pinned = Some(pinned);
		self
	}

	pub fn name_contains(mut self, text: impl Into<String>) -> Self {
		self.name_contains = Some(text.into());
		self
	}

	pub fn matches(&self, record: &LayerRecord) -> bool {
		let flag = |wanted: Option<bool>, actual: bool| wanted.is_none_or(|wanted| wanted == actual);
		self.group.as_deref().is_none_or(|group| group == record.group())
			&& flag(self.visible, record.visible)
			&& flag(self.enabled, record.user.enabled)
			&& flag(self.pinned, record.user.pinned)
			&& flag(self.quick_toggle, record.user.quick_toggle)
			&& self
				.name_contains
				.as_deref()
				.is_none_or(|text| record.name().to_lowercase().contains(&text.to_lowercase()))
	}
}

impl<S: LayerStore> LayerEngine<S> {
	/// Shows a layer. Showing an opaque layer hides every other visible
	/// opaque layer.
	pub fn show(&mut self, id: &str) -> Result<()> {
		let index = self.require(id)?;
		if self.reveal(index)? {
			self.save()?;
		}
		Ok(())
	}

	/// Shows a layer and hides every other one.
	pub fn show_exclusive(&mut self, id: &str) -> Result<()> {
		let index = self.require(id)?;
		let mut changed = false;
		for other in 0..self.layers.len() {
			if other != index {
				changed |= self.set_visible(other, false)?;
			}
		}
		changed |= self.set_visible(index, true)?;
		if changed {
			self.save()?;
		}
		Ok(())
	}

	pub fn hide(&mut self, id: &str) -> Result<()> {
		let index = self.require(id)?;
		if self.set_visible(index, false)? {
			self.save()?;
		}
		Ok(())
	}

	/// Matching records in render order.
	pub fn filter(&self, filter: &LayerFilter) -> Vec<Arc<LayerRecord>> {
		self.sorted_where(|record| filter.matches(record))
			.into_iter()
			.map(|layer| layer.record)
			.collect()
	}

	pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
		self.update_user(id, |record| record.user.enabled = enabled)
	}

	pub fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<()> {
		self.update_user(id, |record| record.user.pinned = pinned)
	}

	pub fn set_quick_toggle(&mut self, id: &str, quick_toggle: bool) -> Result<()> {
		self.update_user(id, |record| record.user.quick_toggle = quick_toggle)
	}

	pub fn set_group_index(&mut self, id: &str, group_index: i64) -> Result<()> {
		self.update_user(id, |record| record.user.group_index = group_index)
	}

	/// Hides every visible quick-toggle layer in `viewport`, or brings back
	/// what the previous call hid.
	///
	/// Restoring falls back, in order, to: the remembered layers still in
	/// the viewport; the highest-priority enabled quick-toggle layer in the
	/// viewport; the highest-priority enabled quick-toggle layer anywhere.
	pub fn quick_toggle(&mut self, viewport: &BoundingBox) -> Result<QuickToggleOutcome> {
		let active: Vec<String> = self
			.sorted_where(|record| record.visible && record.user.quick_toggle)
			.into_iter()
			.filter(|layer| layer.intersects(viewport))
			.map(|layer| layer.id().to_owned())
			.collect();

		if !active.is_empty() {
			for id in &active {
				let index = self.require(id)?;
				self.set_visible(index, false)?;
			}
			let count = active.len();
			self.quick_toggle_memory = Some(active);
			self.save()?;
			tracing::debug!(count, "quick_toggle.hidden");
			return Ok(QuickToggleOutcome { count, restore: false });
		}

		let remembered: Vec<String> = self
			.quick_toggle_memory
			.take()
			.unwrap_or_default()
			.into_iter()
			.filter(|id| {
				self.index_of(id)
					.is_some_and(|index| self.classify(index).intersects(viewport))
			})
			.collect();
		let restore = if remembered.is_empty() {
			let candidates = self.sorted_where(|record| record.user.quick_toggle && record.user.enabled);
			candidates
				.iter()
				.find(|layer| layer.intersects(viewport))
				.or(candidates.first())
				.map(|layer| vec![layer.id().to_owned()])
				.unwrap_or_default()
		} else {
			remembered
		};

		let mut changed = false;
		for id in &restore {
			let index = self.require(id)?;
			changed |= self.reveal(index)?;
		}
		if changed {
			self.save()?;
		}
		tracing::debug!(count = restore.len(), "quick_toggle.restored");
		Ok(QuickToggleOutcome {
			count: restore.len(),
			restore: true,
		})
	}

	/// Cycles through pinned opaque layers.
	///
	/// With none visible the first is shown; with exactly one visible the
	/// next (or previous) one replaces it, wrapping around. Several visible
	/// at once is inconsistent and leaves everything untouched.
	pub fn magic_pinned(&mut self, forward: bool) -> Result<Option<Arc<LayerRecord>>> {
		let rotation: Vec<_> = self
			.sorted_where(|record| record.user.pinned)
			.into_iter()
			.filter(|layer| layer.opaque)
			.collect();
		let visible: Vec<usize> = rotation
			.iter()
			.enumerate()
			.filter(|(_, layer)| layer.record.visible)
			.map(|(position, _)| position)
			.collect();

		let next = match (visible.as_slice(), rotation.len()) {
			(_, 0) => return Ok(None),
			([], _) => 0,
			([current], len) if forward => (current + 1) % len,
			([current], len) => (current + len - 1) % len,
			_ => {
				tracing::debug!(visible = visible.len(), "magic_pinned.inconsistent");
				return Ok(None);
			}
		};
		let id = rotation[next].id().to_owned();
		self.show(&id)?;
		Ok(self.layer(&id).cloned())
	}

	/// Sets visibility without saving. Showing an opaque layer hides the
	/// other visible opaque ones. Returns whether anything changed.
	pub(super) fn reveal(&mut self, index: usize) -> Result<bool> {
		let mut changed = false;
		if self.classify(index).opaque {
			let occluded: Vec<usize> = (0..self.layers.len())
				.filter(|&other| other != index && self.layers[other].visible && self.classify(other).opaque)
				.collect();
			for other in occluded {
				changed |= self.set_visible(other, false)?;
			}
		}
		changed |= self.set_visible(index, true)?;
		Ok(changed)
	}

	fn set_visible(&mut self, index: usize, visible: bool) -> Result<bool> {
		if self.layers[index].visible == visible {
			return Ok(false);
		}
		self.modify(index, |record| record.visible = visible)?;
		Ok(true)
	}

	fn update_user(&mut self, id: &str, edit: impl FnOnce(&mut LayerRecord)) -> Result<()> {
		let index = self.require(id)?;
		self.modify(index, edit)?;
		self.save()
	}
}
