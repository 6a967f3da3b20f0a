// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layers and the resolved logger configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vox_log_core::LogLevel;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_COLLECTOR_PATH: &str = "/api/logs";
const DEFAULT_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_DELIVERY_QUEUE_CAPACITY: usize = 256;
const DEFAULT_DEBUG_STORE_ENTRIES: usize = 20;

/// Runtime mode of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
	#[serde(alias = "dev")]
	Development,
	#[default]
	#[serde(alias = "prod")]
	Production,
	Test,
}

impl RuntimeMode {
	pub fn is_development(self) -> bool {
		self == Self::Development
	}

	/// Threshold used when no explicit minimum level is configured.
	pub fn default_min_level(self) -> LogLevel {
		match self {
			Self::Development => LogLevel::Debug,
			Self::Production | Self::Test => LogLevel::Info,
		}
	}
}

impl fmt::Display for RuntimeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Development => write!(f, "development"),
			Self::Production => write!(f, "production"),
			Self::Test => write!(f, "test"),
		}
	}
}

impl FromStr for RuntimeMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Self::Development),
			"production" | "prod" => Ok(Self::Production),
			"test" => Ok(Self::Test),
			_ => Err(ConfigError::invalid_value(
				"mode",
				format!("unknown runtime mode '{s}'"),
			)),
		}
	}
}

/// Where console output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMode {
	/// Colored lines on stderr.
	#[default]
	Colored,
	/// Forwarded as `tracing` events.
	Tracing,
	Off,
}

impl FromStr for ConsoleMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"colored" | "color" => Ok(Self::Colored),
			"tracing" => Ok(Self::Tracing),
			"off" | "none" => Ok(Self::Off),
			_ => Err(ConfigError::invalid_value(
				"console",
				format!("unknown console mode '{s}'"),
			)),
		}
	}
}

/// One source's view of the configuration. Unset fields defer to
/// lower-precedence layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggerConfigLayer {
	pub mode: Option<RuntimeMode>,
	pub min_level: Option<String>,
	pub base_url: Option<String>,
	pub collector_path: Option<String>,
	pub remote_enabled: Option<bool>,
	pub buffer_capacity: Option<usize>,
	pub delivery_queue_capacity: Option<usize>,
	pub request_timeout_secs: Option<u64>,
	pub debug_store_dir: Option<PathBuf>,
	pub debug_store_entries: Option<usize>,
	pub console: Option<ConsoleMode>,
}

impl LoggerConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.mode.is_some() {
			self.mode = other.mode;
		}
		if other.min_level.is_some() {
			self.min_level = other.min_level;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.collector_path.is_some() {
			self.collector_path = other.collector_path;
		}
		if other.remote_enabled.is_some() {
			self.remote_enabled = other.remote_enabled;
		}
		if other.buffer_capacity.is_some() {
			self.buffer_capacity = other.buffer_capacity;
		}
		if other.delivery_queue_capacity.is_some() {
			self.delivery_queue_capacity = other.delivery_queue_capacity;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
		if other.debug_store_dir.is_some() {
			self.debug_store_dir = other.debug_store_dir;
		}
		if other.debug_store_entries.is_some() {
			self.debug_store_entries = other.debug_store_entries;
		}
		if other.console.is_some() {
			self.console = other.console;
		}
	}

	pub fn finalize(self) -> Result<LoggerConfig, ConfigError> {
		let mode = self.mode.unwrap_or_default();
		let min_level = match self.min_level {
			Some(raw) => raw
				.parse::<LogLevel>()
				.map_err(|e| ConfigError::invalid_value("min_level", e.to_string()))?,
			None => mode.default_min_level(),
		};

		let config = LoggerConfig {
			mode,
			min_level,
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			collector_path: self
				.collector_path
				.unwrap_or_else(|| DEFAULT_COLLECTOR_PATH.to_string()),
			remote_enabled: self.remote_enabled.unwrap_or(true),
			buffer_capacity: self.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY),
			delivery_queue_capacity: self
				.delivery_queue_capacity
				.unwrap_or(DEFAULT_DELIVERY_QUEUE_CAPACITY),
			request_timeout: self.request_timeout_secs.map(Duration::from_secs),
			debug_store_dir: self.debug_store_dir,
			debug_store_entries: self
				.debug_store_entries
				.unwrap_or(DEFAULT_DEBUG_STORE_ENTRIES),
			console: self.console.unwrap_or_default(),
		};

		config.validate()?;
		Ok(config)
	}
}

/// Fully resolved logger configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
	pub mode: RuntimeMode,
	pub min_level: LogLevel,
	pub base_url: String,
	pub collector_path: String,
	pub remote_enabled: bool,
	pub buffer_capacity: usize,
	pub delivery_queue_capacity: usize,
	pub request_timeout: Option<Duration>,
	pub debug_store_dir: Option<PathBuf>,
	pub debug_store_entries: usize,
	pub console: ConsoleMode,
}

impl LoggerConfig {
	/// Full collector endpoint, e.g. `http://localhost:3000/api/logs`.
	pub fn collector_url(&self) -> String {
		let base = self.base_url.trim_end_matches('/');
		if self.collector_path.starts_with('/') {
			format!("{base}{}", self.collector_path)
		} else {
			format!("{base}/{}", self.collector_path)
		}
	}

	/// Defaults for the given runtime mode.
	pub fn for_mode(mode: RuntimeMode) -> Self {
		LoggerConfigLayer {
			mode: Some(mode),
			..Default::default()
		}
		.finalize()
		.unwrap_or_else(|_| unreachable!("built-in defaults are valid"))
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.buffer_capacity == 0 {
			return Err(ConfigError::Validation(
				"buffer_capacity must be greater than zero".to_string(),
			));
		}
		if self.delivery_queue_capacity == 0 {
			return Err(ConfigError::Validation(
				"delivery_queue_capacity must be greater than zero".to_string(),
			));
		}
		if self.remote_enabled && !self.base_url.starts_with("http") {
			return Err(ConfigError::invalid_value(
				"base_url",
				format!("'{}' is not an http(s) URL", self.base_url),
			));
		}
		Ok(())
	}
}

impl Default for LoggerConfig {
	fn default() -> Self {
		Self::for_mode(RuntimeMode::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_min_level_follows_mode() {
		assert_eq!(
			LoggerConfig::for_mode(RuntimeMode::Development).min_level,
			LogLevel::Debug
		);
		assert_eq!(
			LoggerConfig::for_mode(RuntimeMode::Production).min_level,
			LogLevel::Info
		);
	}

	#[test]
	fn test_explicit_min_level_overrides_mode() {
		let config = LoggerConfigLayer {
			mode: Some(RuntimeMode::Development),
			min_level: Some("warn".to_string()),
			..Default::default()
		}
		.finalize()
		.unwrap();
		assert_eq!(config.min_level, LogLevel::Warn);
	}

	#[test]
	fn test_invalid_min_level_is_rejected() {
		let result = LoggerConfigLayer {
			min_level: Some("loud".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn test_zero_capacity_is_rejected() {
		let result = LoggerConfigLayer {
			buffer_capacity: Some(0),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_merge_prefers_other() {
		let mut base = LoggerConfigLayer {
			base_url: Some("http://a".to_string()),
			buffer_capacity: Some(10),
			..Default::default()
		};
		base.merge(LoggerConfigLayer {
			base_url: Some("http://b".to_string()),
			..Default::default()
		});

		assert_eq!(base.base_url.as_deref(), Some("http://b"));
		assert_eq!(base.buffer_capacity, Some(10));
	}

	#[test]
	fn test_collector_url_joins_cleanly() {
		let mut config = LoggerConfig::default();
		config.base_url = "https://vox.example.org/".to_string();
		assert_eq!(config.collector_url(), "https://vox.example.org/api/logs");

		config.collector_path = "ingest".to_string();
		assert_eq!(config.collector_url(), "https://vox.example.org/ingest");
	}

	#[test]
	fn test_defaults() {
		let config = LoggerConfig::default();
		assert_eq!(config.mode, RuntimeMode::Production);
		assert_eq!(config.buffer_capacity, 1000);
		assert_eq!(config.debug_store_entries, 20);
		assert_eq!(config.console, ConsoleMode::Colored);
		assert!(config.remote_enabled);
		assert!(config.request_timeout.is_none());
	}

	proptest! {
		#[test]
		fn prop_merge_takes_set_fields_from_other(
			base_capacity in proptest::option::of(1usize..10_000),
			other_capacity in proptest::option::of(1usize..10_000),
			base_remote in proptest::option::of(proptest::bool::ANY),
			other_remote in proptest::option::of(proptest::bool::ANY),
		) {
			let mut merged = LoggerConfigLayer {
				buffer_capacity: base_capacity,
				remote_enabled: base_remote,
				..Default::default()
			};
			merged.merge(LoggerConfigLayer {
				buffer_capacity: other_capacity,
				remote_enabled: other_remote,
				..Default::default()
			});

			prop_assert_eq!(merged.buffer_capacity, other_capacity.or(base_capacity));
			prop_assert_eq!(merged.remote_enabled, other_remote.or(base_remote));
		}
	}
}
