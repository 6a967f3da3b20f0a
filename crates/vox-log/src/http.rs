// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client construction with a consistent User-Agent header.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Returns the logger's User-Agent string.
///
/// Format: `vox-log/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"vox-log/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}

/// Creates an HTTP client builder with the standard User-Agent header.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates an HTTP client, applying `timeout` when one is configured.
pub fn new_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
	let builder = builder();
	match timeout {
		Some(timeout) => builder.timeout(timeout).build(),
		None => builder.build(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		assert!(ua.starts_with("vox-log/"));
		assert!(ua.contains(std::env::consts::OS));
		assert!(ua.ends_with(')'));
	}

	#[test]
	fn client_builds_with_and_without_timeout() {
		assert!(new_client(None).is_ok());
		assert!(new_client(Some(Duration::from_secs(2))).is_ok());
	}
}
