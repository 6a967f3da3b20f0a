// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Thread-safe ring buffer for log entries.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use vox_log_core::{LogEntry, LogLevel};

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1000;

const BROADCAST_CAPACITY: usize = 256;

/// A thread-safe ring buffer holding the most recent log entries.
///
/// When the buffer is full the oldest entry is evicted to make room. Entries
/// are kept in the order they were pushed. New entries are also broadcast to
/// live subscribers.
#[derive(Clone)]
pub struct LogBuffer {
	inner: Arc<LogBufferInner>,
}

struct LogBufferInner {
	entries: RwLock<VecDeque<LogEntry>>,
	capacity: usize,
	sender: broadcast::Sender<LogEntry>,
}

impl LogBuffer {
	/// Create a new log buffer with the specified capacity (at least one).
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
		Self {
			inner: Arc::new(LogBufferInner {
				entries: RwLock::new(VecDeque::with_capacity(capacity)),
				capacity,
				sender,
			}),
		}
	}

	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}

	/// Append an entry, evicting the oldest one if the buffer is full.
	pub fn push(&self, entry: LogEntry) {
		{
			let mut entries = self.inner.entries.write();
			while entries.len() >= self.inner.capacity {
				entries.pop_front();
			}
			entries.push_back(entry.clone());
		}

		// No subscribers is fine
		let _ = self.inner.sender.send(entry);
	}

	/// The last `count` entries, oldest first.
	pub fn recent(&self, count: usize) -> Vec<LogEntry> {
		let entries = self.inner.entries.read();
		let skip = entries.len().saturating_sub(count);
		entries.iter().skip(skip).cloned().collect()
	}

	/// All entries at or above `min_level`, oldest first.
	pub fn at_or_above(&self, min_level: LogLevel) -> Vec<LogEntry> {
		self
			.inner
			.entries
			.read()
			.iter()
			.filter(|e| e.level >= min_level)
			.cloned()
			.collect()
	}

	/// Every buffered entry, oldest first.
	pub fn snapshot(&self) -> Vec<LogEntry> {
		self.inner.entries.read().iter().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.inner.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.entries.read().is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	/// Subscribe to entries as they are pushed.
	pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
		self.inner.sender.subscribe()
	}

	pub fn clear(&self) {
		self.inner.entries.write().clear();
	}
}

impl Default for LogBuffer {
	fn default() -> Self {
		Self::with_default_capacity()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use proptest::prelude::*;

	fn entry(level: LogLevel, message: &str) -> LogEntry {
		LogEntry::new(Utc::now(), level, "GENERAL", message)
	}

	#[test]
	fn test_push_and_recent() {
		let buffer = LogBuffer::new(100);

		buffer.push(entry(LogLevel::Info, "message 1"));
		buffer.push(entry(LogLevel::Warn, "message 2"));

		let entries = buffer.recent(10);
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].message, "message 1");
		assert_eq!(entries[1].message, "message 2");
	}

	#[test]
	fn test_recent_returns_tail_in_order() {
		let buffer = LogBuffer::new(100);
		for i in 0..10 {
			buffer.push(entry(LogLevel::Info, &format!("msg {i}")));
		}

		let entries = buffer.recent(3);
		let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
		assert_eq!(messages, vec!["msg 7", "msg 8", "msg 9"]);
	}

	#[test]
	fn test_capacity_eviction() {
		let buffer = LogBuffer::new(3);

		for i in 1..=4 {
			buffer.push(entry(LogLevel::Info, &format!("msg {i}")));
		}

		assert_eq!(buffer.len(), 3);
		let entries = buffer.snapshot();
		assert_eq!(entries[0].message, "msg 2");
		assert_eq!(entries[2].message, "msg 4");
	}

	#[test]
	fn test_level_filter() {
		let buffer = LogBuffer::new(100);

		buffer.push(entry(LogLevel::Debug, "debug"));
		buffer.push(entry(LogLevel::Info, "info"));
		buffer.push(entry(LogLevel::Warn, "warn"));
		buffer.push(entry(LogLevel::Security, "security"));

		let entries = buffer.at_or_above(LogLevel::Warn);
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].message, "warn");
		assert_eq!(entries[1].message, "security");
	}

	#[test]
	fn test_zero_capacity_is_clamped() {
		let buffer = LogBuffer::new(0);
		buffer.push(entry(LogLevel::Info, "only"));
		assert_eq!(buffer.capacity(), 1);
		assert_eq!(buffer.len(), 1);
	}

	#[test]
	fn test_clear() {
		let buffer = LogBuffer::new(10);
		buffer.push(entry(LogLevel::Info, "x"));
		buffer.clear();
		assert!(buffer.is_empty());
		assert!(buffer.recent(10).is_empty());
	}

	#[tokio::test]
	async fn test_broadcast_subscription() {
		let buffer = LogBuffer::new(100);
		let mut rx = buffer.subscribe();

		buffer.push(entry(LogLevel::Info, "broadcast test"));

		let received = rx.recv().await.unwrap();
		assert_eq!(received.message, "broadcast test");
	}

	proptest! {
		#[test]
		fn prop_buffer_keeps_newest_within_capacity(capacity in 1usize..50, pushes in 0usize..200) {
			let buffer = LogBuffer::new(capacity);
			for i in 0..pushes {
				buffer.push(entry(LogLevel::Info, &i.to_string()));
			}

			let entries = buffer.snapshot();
			prop_assert_eq!(entries.len(), pushes.min(capacity));
			let expected: Vec<String> = (pushes.saturating_sub(capacity)..pushes)
				.map(|i| i.to_string())
				.collect();
			let actual: Vec<String> = entries.into_iter().map(|e| e.message).collect();
			prop_assert_eq!(actual, expected);
		}
	}
}
