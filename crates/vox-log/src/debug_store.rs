// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistent key-value store for development debugging.
//!
//! In development mode the logger overwrites [`DEBUG_STORE_KEY`] with the
//! newest entries after every log call. The logger never reads the store back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use vox_log_core::LogEntry;

use crate::error::DebugStoreError;

/// Key under which recent entries are persisted.
pub const DEBUG_STORE_KEY: &str = "voice_data_logs";

/// Default number of entries persisted.
pub const DEFAULT_DEBUG_STORE_ENTRIES: usize = 20;

pub trait DebugStore: Send + Sync {
	fn put(&self, key: &str, value: &str) -> Result<(), DebugStoreError>;
}

/// Overwrites [`DEBUG_STORE_KEY`] with `entries` as a JSON array.
pub fn persist_entries(store: &dyn DebugStore, entries: &[LogEntry]) -> Result<(), DebugStoreError> {
	let json = serde_json::to_string(entries)?;
	store.put(DEBUG_STORE_KEY, &json)
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileDebugStore {
	dir: PathBuf,
}

impl FileDebugStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn path_for(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{key}.json"))
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}
}

impl DebugStore for FileDebugStore {
	fn put(&self, key: &str, value: &str) -> Result<(), DebugStoreError> {
		std::fs::create_dir_all(&self.dir)?;
		let path = self.path_for(key);
		let tmp = path.with_extension("json.tmp");
		std::fs::write(&tmp, value)?;
		std::fs::rename(&tmp, &path)?;
		Ok(())
	}
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryDebugStore {
	values: Mutex<HashMap<String, String>>,
}

impl MemoryDebugStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<String> {
		self.values.lock().get(key).cloned()
	}
}

impl DebugStore for MemoryDebugStore {
	fn put(&self, key: &str, value: &str) -> Result<(), DebugStoreError> {
		self.values.lock().insert(key.to_string(), value.to_string());
		Ok(())
	}
}
