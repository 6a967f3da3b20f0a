// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remote collector transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};
use vox_log_core::LogEntry;

use crate::error::{DeliveryError, LoggerError};

/// Sends a single entry to the remote collector.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
	async fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError>;
}

/// POSTs each entry as JSON to a fixed collector endpoint.
pub struct HttpTransport {
	client: Client,
	endpoint: String,
}

impl HttpTransport {
	pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LoggerError> {
		let client = crate::http::new_client(timeout).map_err(LoggerError::HttpClient)?;
		Ok(Self::with_client(client, endpoint))
	}

	pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
		Self {
			client,
			endpoint: endpoint.into(),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

#[async_trait]
impl RemoteTransport for HttpTransport {
	#[instrument(skip(self, entry), fields(endpoint = %self.endpoint, level = %entry.level))]
	async fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError> {
		let body = serde_json::to_vec(entry)?;

		let response = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(DeliveryError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		debug!(status = status.as_u16(), "log entry delivered");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use vox_log_core::{LogLevel, Metadata, COMPLIANCE_TAG};
	use wiremock::matchers::{body_partial_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn security_entry() -> LogEntry {
		let mut entry = LogEntry::new(Utc::now(), LogLevel::Security, "SECURITY", "role changed");
		entry.compliance = Some(COMPLIANCE_TAG.to_string());
		entry.metadata = Metadata::new().insert("role", "admin");
		entry
	}

	#[tokio::test]
	async fn test_posts_json_entry() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/logs"))
			.and(header("content-type", "application/json"))
			.and(body_partial_json(serde_json::json!({
				"level": 4,
				"message": "role changed",
				"category": "SECURITY",
				"compliance": "GDPR",
				"metadata": {"role": "admin"}
			})))
			.respond_with(ResponseTemplate::new(200))
			.expect(1)
			.mount(&server)
			.await;

		let transport = HttpTransport::new(format!("{}/api/logs", server.uri()), None).unwrap();
		transport.deliver(&security_entry()).await.unwrap();
	}

	#[tokio::test]
	async fn test_non_success_status_is_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(503).set_body_string("down"))
			.mount(&server)
			.await;

		let transport = HttpTransport::new(format!("{}/api/logs", server.uri()), None).unwrap();
		let result = transport.deliver(&security_entry()).await;

		match result {
			Err(DeliveryError::ServerError { status, message }) => {
				assert_eq!(status, 503);
				assert_eq!(message, "down");
			}
			other => panic!("expected server error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_connection_failure_is_request_error() {
		let transport = HttpTransport::new(
			"http://127.0.0.1:9/api/logs",
			Some(Duration::from_millis(500)),
		)
		.unwrap();

		let result = transport.deliver(&security_entry()).await;
		assert!(matches!(result, Err(DeliveryError::RequestFailed(_))));
	}
}
