// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Console sinks.
//!
//! Every entry that passes the threshold is mirrored to a console sink as
//! `[timestamp] LEVEL [category] message` plus its metadata. The sink also
//! carries the logger's own diagnostics (failed deliveries, store errors);
//! those are plain lines and never become entries, so reporting a failure can
//! never trigger another delivery.

use std::io::Write;

use colored::{ColoredString, Colorize};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use vox_log_core::{LogEntry, LogLevel};

/// Destination for the console mirror of each entry.
pub trait ConsoleSink: Send + Sync {
	fn write(&self, entry: &LogEntry);

	/// Reports an internal fault of the logger itself.
	fn diagnostic(&self, message: &str) {
		warn!(target: "vox_log::internal", "{message}");
	}
}

fn metadata_json(entry: &LogEntry) -> Option<String> {
	if entry.metadata.is_empty() {
		return None;
	}
	serde_json::to_string(&entry.metadata).ok()
}

/// Colored lines on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColoredConsole;

impl ColoredConsole {
	fn paint(level: LogLevel, line: String) -> ColoredString {
		match level {
			LogLevel::Debug => line.bright_black(),
			LogLevel::Info => line.blue(),
			LogLevel::Warn => line.yellow(),
			LogLevel::Error => line.red(),
			LogLevel::Security => line.magenta().bold(),
		}
	}
}

impl ConsoleSink for ColoredConsole {
	fn write(&self, entry: &LogEntry) {
		let line = Self::paint(entry.level, entry.console_line());
		let mut stderr = std::io::stderr().lock();
		let _ = match metadata_json(entry) {
			Some(meta) => writeln!(stderr, "{line} {}", meta.dimmed()),
			None => writeln!(stderr, "{line}"),
		};
	}

	fn diagnostic(&self, message: &str) {
		let _ = writeln!(std::io::stderr().lock(), "{}", message.yellow());
	}
}

/// Forwards entries to `tracing` so they share the host's subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
	fn write(&self, entry: &LogEntry) {
		let line = entry.console_line();
		let meta = metadata_json(entry).unwrap_or_default();
		match entry.level {
			LogLevel::Debug => debug!(target: "vox_log", metadata = %meta, "{line}"),
			LogLevel::Info => info!(target: "vox_log", metadata = %meta, "{line}"),
			LogLevel::Warn => warn!(target: "vox_log", metadata = %meta, "{line}"),
			LogLevel::Error => error!(target: "vox_log", metadata = %meta, "{line}"),
			LogLevel::Security => warn!(target: "vox_log::security", metadata = %meta, "{line}"),
		}
	}
}

/// Discards entries. Diagnostics still go to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullConsole;

impl ConsoleSink for NullConsole {
	fn write(&self, _entry: &LogEntry) {}
}

/// Captures console output in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
	lines: Mutex<Vec<String>>,
	diagnostics: Mutex<Vec<String>>,
}

impl MemoryConsole {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn lines(&self) -> Vec<String> {
		self.lines.lock().clone()
	}

	pub fn diagnostics(&self) -> Vec<String> {
		self.diagnostics.lock().clone()
	}
}

impl ConsoleSink for MemoryConsole {
	fn write(&self, entry: &LogEntry) {
		let line = match metadata_json(entry) {
			Some(meta) => format!("{} {meta}", entry.console_line()),
			None => entry.console_line(),
		};
		self.lines.lock().push(line);
	}

	fn diagnostic(&self, message: &str) {
		self.diagnostics.lock().push(message.to_string());
	}
}
