// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator CLI for the Vox structured logger.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vox_log::Logger;
use vox_log_config::LoggerConfig;
use vox_log_core::{category, mask_sensitive_data, LogLevel, Metadata, SensitiveKind};

/// Upper bound on waiting for the collector before exiting.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// vox-logctl - inspect and exercise the Vox structured logger.
#[derive(Parser, Debug)]
#[command(name = "vox-logctl", about = "Vox structured logger tool", version)]
struct Args {
	/// TOML config file (defaults to ./vox-log.toml when present)
	#[arg(long, global = true, env = "VOX_LOG_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Mask a value the way the logger does
	Mask {
		/// password, email, phone, age, ssn, creditCard; anything else uses the default rule
		kind: SensitiveKind,
		value: String,
	},
	/// Log one entry through the configured logger and wait for delivery
	Send {
		#[arg(long, default_value = "info")]
		level: LogLevel,
		#[arg(long, default_value = category::GENERAL)]
		category: String,
		message: String,
		/// Metadata as key=value; values that parse as JSON keep their type
		#[arg(long = "meta", value_parser = parse_meta)]
		meta: Vec<(String, Value)>,
	},
	/// Print the resolved configuration
	Config,
	/// Show version and build information
	Version,
}

fn parse_meta(raw: &str) -> Result<(String, Value), String> {
	let Some((key, value)) = raw.split_once('=') else {
		return Err(format!("expected key=value, got '{raw}'"));
	};
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("empty metadata key in '{raw}'"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<LoggerConfig> {
	let config = match path {
		Some(path) => vox_log_config::load_config_with_file(&path)
			.with_context(|| format!("loading config from {}", path.display()))?,
		None => vox_log_config::load_config().context("loading config")?,
	};
	Ok(config)
}

fn format_config(config: &LoggerConfig) -> String {
	let timeout = config
		.request_timeout
		.map(|t| format!("{}s", t.as_secs()))
		.unwrap_or_else(|| "none".to_string());
	let debug_dir = config
		.debug_store_dir
		.as_ref()
		.map(|d| d.display().to_string())
		.unwrap_or_else(|| "memory".to_string());

	format!(
		"mode:                    {}\n\
		 min_level:               {}\n\
		 collector:               {}\n\
		 remote_enabled:          {}\n\
		 buffer_capacity:         {}\n\
		 delivery_queue_capacity: {}\n\
		 request_timeout:         {}\n\
		 debug_store:             {} ({} entries)\n\
		 console:                 {:?}",
		config.mode,
		config.min_level,
		config.collector_url(),
		config.remote_enabled,
		config.buffer_capacity,
		config.delivery_queue_capacity,
		timeout,
		debug_dir,
		config.debug_store_entries,
		config.console,
	)
}

fn format_version_info() -> String {
	format!(
		"vox-logctl version: {}\n\
		 Platform:           {}-{}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	match args.command {
		Command::Mask { kind, value } => {
			println!("{}", mask_sensitive_data(&value, kind));
		}
		Command::Send {
			level,
			category,
			message,
			meta,
		} => {
			let config = load_config(args.config)?;
			if level < config.min_level {
				bail!(
					"level {level} is below the configured minimum {}; nothing would be logged",
					config.min_level
				);
			}

			let logger = Logger::from_config(&config).context("building logger")?;
			let metadata: Metadata = meta.into_iter().collect();
			logger.log(level, &category, message, metadata);
			if tokio::time::timeout(DRAIN_TIMEOUT, logger.shutdown())
				.await
				.is_err()
			{
				tracing::warn!(
					timeout_secs = DRAIN_TIMEOUT.as_secs(),
					"collector did not respond before exit; entry kept locally only"
				);
			}

			tracing::info!(
				session_id = logger.session_id(),
				remote = config.remote_enabled,
				"entry logged"
			);
		}
		Command::Config => {
			let config = load_config(args.config)?;
			println!("{}", format_config(&config));
		}
		Command::Version => {
			println!("{}", format_version_info());
		}
	}

	Ok(())
}
