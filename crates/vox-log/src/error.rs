// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the logger runtime.
//!
//! None of these escape the public logging methods; they surface only from
//! construction, from the transport and store traits, and in diagnostics.

use thiserror::Error;

/// Failure to hand one entry to the remote collector.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Collector answered with a non-success status.
	#[error("collector error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Entry could not be encoded.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Failure writing the development debug store.
#[derive(Debug, Error)]
pub enum DebugStoreError {
	#[error("debug store I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("debug store serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Failure constructing a logger.
#[derive(Debug, Error)]
pub enum LoggerError {
	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[source] reqwest::Error),

	#[error(transparent)]
	Config(#[from] vox_log_config::ConfigError),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_server_error_display() {
		let err = DeliveryError::ServerError {
			status: 503,
			message: "collector unavailable".to_string(),
		};
		assert_eq!(err.to_string(), "collector error (503): collector unavailable");
	}

	#[test]
	fn test_store_io_error_converts() {
		let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
		let err: DebugStoreError = io.into();
		assert!(matches!(err, DebugStoreError::Io(_)));
	}
}
