// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the Vox structured logger.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`VOX_LOG_*`)
//!
//! # Usage
//!
//! ```ignore
//! use vox_log_config::load_config;
//!
//! let config = load_config()?;
//! println!("collector: {}", config.collector_url());
//! ```

pub mod error;
pub mod layer;
pub mod sources;

pub use error::ConfigError;
pub use layer::{ConsoleMode, LoggerConfig, LoggerConfigLayer, RuntimeMode};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`VOX_LOG_*`)
/// 2. Config file (`./vox-log.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<LoggerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::local()),
		Box::new(EnvSource::process()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<LoggerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::process()),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LoggerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LoggerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let config = merged.finalize()?;

	info!(
		mode = %config.mode,
		min_level = %config.min_level,
		collector = %config.collector_url(),
		remote_enabled = config.remote_enabled,
		buffer_capacity = config.buffer_capacity,
		"Logger configuration loaded"
	);

	Ok(config)
}
