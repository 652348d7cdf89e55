//! Path-based access into untyped style JSON.
//!
//! Style fragments keep sources and layers as [`serde_json::Value`] trees so
//! renderer-specific properties survive untouched. These helpers are the only
//! way the rest of the workspace reaches into them: lookups return `Option`,
//! writes return `Result`, and nothing relies on dynamic member access.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde_json::{Map, Value};

/// Failure to write through a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	#[error("empty JSON path")]
	Empty,
	#[error("cannot descend into {segment:?} of {path:?}: parent is not an object")]
	NotAnObject { path: String, segment: String },
}

/// Looks up the value at `path`, descending through objects only.
pub fn get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
	path.iter().try_fold(value, |node, key| node.as_object()?.get(*key))
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
	path.iter().try_fold(value, |node, key| node.as_object_mut()?.get_mut(*key))
}

pub fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
	get(value, path)?.as_str()
}

pub fn get_f64(value: &Value, path: &[&str]) -> Option<f64> {
	get(value, path)?.as_f64()
}

/// Writes `new` at `path`, creating intermediate objects as needed.
///
/// Returns the value previously stored at `path`, if any.
pub fn set(value: &mut Value, path: &[&str], new: Value) -> Result<Option<Value>, PathError> {
	let (last, parents) = path.split_last().ok_or(PathError::Empty)?;
	let mut node = value;
	for (depth, key) in parents.iter().enumerate() {
		node = match node {
			Value::Object(map) => map.entry(*key).or_insert_with(|| Value::Object(Map::new())),
			_ => return Err(not_an_object(path, depth)),
		};
	}
	match node {
		Value::Object(map) => Ok(map.insert((*last).to_owned(), new)),
		_ => Err(not_an_object(path, parents.len())),
	}
}

fn not_an_object(path: &[&str], depth: usize) -> PathError {
	PathError::NotAnObject {
		path: path.join("."),
		segment: path[depth].to_owned(),
	}
}

/// Structural hash of a JSON tree.
///
/// Object keys are hashed in stored order, so two objects that differ only in
/// key order hash differently. That only costs a cache miss.
pub fn content_hash(value: &Value) -> u64 {
	let mut hasher = FxHasher::default();
	hash_value(value, &mut hasher);
	hasher.finish()
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
	match value {
		Value::Null => state.write_u8(0),
		Value::Bool(b) => {
			state.write_u8(1);
			b.hash(state);
		}
		Value::Number(n) => {
			state.write_u8(2);
			n.hash(state);
		}
		Value::String(s) => {
			state.write_u8(3);
			s.hash(state);
		}
		Value::Array(items) => {
			state.write_u8(4);
			state.write_usize(items.len());
			for item in items {
				hash_value(item, state);
			}
		}
		Value::Object(map) => {
			state.write_u8(5);
			state.write_usize(map.len());
			for (key, item) in map {
				key.hash(state);
				hash_value(item, state);
			}
		}
	}
}
