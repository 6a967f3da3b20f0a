// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The log entry record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::level::LogLevel;
use crate::metadata::Metadata;

/// Compliance label attached to entries that involve personal-data handling.
pub const COMPLIANCE_TAG: &str = "GDPR";

/// One record of a single logging call.
///
/// Entries are built once by the logger and only ever cloned afterwards; the
/// copy held in the ring buffer is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	pub message: String,
	pub category: String,
	/// Masked form of the acting user's id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Metadata::is_empty")]
	pub metadata: Metadata,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub compliance: Option<String>,
}

impl LogEntry {
	pub fn new(
		timestamp: DateTime<Utc>,
		level: LogLevel,
		category: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self {
			timestamp,
			level,
			message: message.into(),
			category: category.into(),
			user_id: None,
			session_id: None,
			user_agent: None,
			url: None,
			metadata: Metadata::new(),
			compliance: None,
		}
	}

	/// Whether the entry must reach the remote collector: WARN and above, or
	/// anything carrying a compliance tag.
	pub fn is_remote_eligible(&self) -> bool {
		self.level >= LogLevel::Warn || self.compliance.is_some()
	}

	/// `[timestamp] LEVEL [category] message`
	pub fn console_line(&self) -> String {
		format!(
			"[{}] {} [{}] {}",
			self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
			self.level,
			self.category,
			self.message
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn fixed_time() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
	}

	#[test]
	fn test_json_shape() {
		let mut entry = LogEntry::new(fixed_time(), LogLevel::Warn, "API", "slow upload");
		entry.session_id = Some("sess-1".to_string());
		entry.user_id = Some("us****".to_string());
		entry.metadata = Metadata::new().insert("duration", 5000);

		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["level"], 2);
		assert_eq!(json["userId"], "us****");
		assert_eq!(json["sessionId"], "sess-1");
		assert_eq!(json["metadata"]["duration"], 5000);
		assert!(json.get("compliance").is_none());
		assert!(json.get("userAgent").is_none());
	}

	#[test]
	fn test_empty_metadata_is_omitted_and_restored() {
		let entry = LogEntry::new(fixed_time(), LogLevel::Info, "GENERAL", "hello");
		let text = serde_json::to_string(&entry).unwrap();
		assert!(!text.contains("metadata"));

		let parsed: LogEntry = serde_json::from_str(&text).unwrap();
		assert_eq!(parsed, entry);
	}

	#[test]
	fn test_remote_eligibility() {
		let info = LogEntry::new(fixed_time(), LogLevel::Info, "GENERAL", "x");
		assert!(!info.is_remote_eligible());

		let mut tagged = info.clone();
		tagged.compliance = Some(COMPLIANCE_TAG.to_string());
		assert!(tagged.is_remote_eligible());

		let warn = LogEntry::new(fixed_time(), LogLevel::Warn, "GENERAL", "x");
		assert!(warn.is_remote_eligible());
	}

	#[test]
	fn test_console_line_shape() {
		let entry = LogEntry::new(fixed_time(), LogLevel::Security, "SECURITY", "role changed");
		assert_eq!(
			entry.console_line(),
			"[2025-03-14T09:26:53.000Z] SECURITY [SECURITY] role changed"
		);
	}
}
