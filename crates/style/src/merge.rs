//! Folds per-layer style fragments into the single document handed to the
//! renderer.
//!
//! Input order is render priority, top layer first. Fragments are processed
//! bottom-up so that:
//!
//! * on a source id collision the higher fragment's source wins;
//! * style layers stack bottom to top in document order;
//! * `sprite`, `glyphs` and `terrain` keep the first non-null value seen,
//!   i.e. the lowest fragment that defines one. A higher fragment cannot
//!   replace them even when it needs its own sprite sheet.

use crate::fragment::{LayerKind, StyleFragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
	/// Defer `symbol` layers until after every other layer so labels are
	/// never drawn beneath an opaque fill.
	pub hoist_symbols: bool,
}

/// Merges fragments given top-first into one version 8 style document.
pub fn merge<'a, I>(fragments: I, options: MergeOptions) -> StyleFragment
where
	I: IntoIterator<Item = &'a StyleFragment>,
	I::IntoIter: DoubleEndedIterator,
{
	let mut merged = StyleFragment::default();
	let mut hoisted = Vec::new();

	for fragment in fragments.into_iter().rev() {
		for (id, source) in &fragment.sources {
			merged.sources.insert(id.clone(), source.clone());
		}
		for layer in &fragment.layers {
			if options.hoist_symbols && LayerKind::of(layer) == LayerKind::Symbol {
				hoisted.push(layer.clone());
			} else {
				merged.layers.push(layer.clone());
			}
		}
		if merged.sprite.is_none() {
			merged.sprite.clone_from(&fragment.sprite);
		}
		if merged.glyphs.is_none() {
			merged.glyphs.clone_from(&fragment.glyphs);
		}
		if merged.terrain.is_none() {
			merged.terrain.clone_from(&fragment.terrain);
		}
	}

	merged.layers.extend(hoisted);
	merged
}

#[cfg(test)]
mod tests;
