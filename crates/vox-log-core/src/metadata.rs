// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Open key/value bag attached to log entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event-specific detail carried on a [`LogEntry`](crate::LogEntry).
///
/// Keys keep insertion order. Values are any JSON value, so nested maps and
/// sequences serialize the same way they were built.
///
/// # Example
///
/// ```
/// use vox_log_core::Metadata;
///
/// let meta = Metadata::new()
///     .insert("recordingId", "rec_42")
///     .insert("durationMs", 5120)
///     .insert("retry", false);
/// assert_eq!(meta.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
	inner: Map<String, Value>,
}

impl Metadata {
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a key-value pair, replacing any previous value for the key.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Inserts the value only when it is present.
	pub fn insert_opt<K, V>(self, key: K, value: Option<V>) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		match value {
			Some(value) => self.insert(key, value),
			None => self,
		}
	}

	/// Merges another bag into this one. On key collisions `other` wins.
	pub fn merge(mut self, other: Metadata) -> Self {
		for (k, v) in other.inner {
			self.inner.insert(k, v);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.inner.iter()
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.inner)
	}
}

impl From<Metadata> for Value {
	fn from(meta: Metadata) -> Self {
		meta.into_value()
	}
}

impl From<Value> for Metadata {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Self { inner: map },
			_ => Self::new(),
		}
	}
}

impl From<Map<String, Value>> for Metadata {
	fn from(map: Map<String, Value>) -> Self {
		Self { inner: map }
	}
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_insert_keeps_order() {
		let meta = Metadata::new()
			.insert("zeta", 1)
			.insert("alpha", 2)
			.insert("mid", 3);

		let keys: Vec<&str> = meta.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
	}

	#[test]
	fn test_insert_opt_skips_none() {
		let meta = Metadata::new()
			.insert_opt("status", Some(200))
			.insert_opt::<_, i64>("duration", None);

		assert_eq!(meta.len(), 1);
		assert_eq!(meta.get("status"), Some(&Value::from(200)));
	}

	#[test]
	fn test_merge_other_wins() {
		let base = Metadata::new().insert("a", 1).insert("b", 2);
		let merged = base.merge(Metadata::new().insert("b", 20).insert("c", 3));

		assert_eq!(merged.len(), 3);
		assert_eq!(merged.get("b"), Some(&Value::from(20)));
	}

	#[test]
	fn test_nested_values_serialize() {
		let meta = Metadata::new()
			.insert("fields", serde_json::json!({"email": "us****@****.com"}))
			.insert("tags", serde_json::json!(["a", "b"]))
			.insert("missing", Value::Null);

		let json = serde_json::to_value(&meta).unwrap();
		assert_eq!(json["fields"]["email"], "us****@****.com");
		assert_eq!(json["tags"][1], "b");
		assert!(json["missing"].is_null());
	}

	#[test]
	fn test_from_non_object_value_is_empty() {
		let meta = Metadata::from(Value::String("nope".to_string()));
		assert!(meta.is_empty());
	}

	proptest! {
		#[test]
		fn len_matches_unique_keys(keys in proptest::collection::vec("[a-z]{1,8}", 0..20)) {
			let unique: std::collections::HashSet<_> = keys.iter().cloned().collect();
			let meta: Metadata = keys.iter().map(|k| (k.clone(), "v")).collect();
			prop_assert_eq!(meta.len(), unique.len());
		}
	}
}
