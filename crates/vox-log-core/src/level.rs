// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Severity levels for log entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Ordered severity rank of a log entry.
///
/// On the wire a level is its numeric rank (`Debug` = 0 … `Security` = 4), which
/// is what the collector endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	Debug = 0,
	Info = 1,
	Warn = 2,
	Error = 3,
	Security = 4,
}

impl LogLevel {
	pub const ALL: [LogLevel; 5] = [
		LogLevel::Debug,
		LogLevel::Info,
		LogLevel::Warn,
		LogLevel::Error,
		LogLevel::Security,
	];

	pub fn rank(self) -> u8 {
		self as u8
	}

	pub fn from_rank(rank: u8) -> Result<Self, CoreError> {
		Self::ALL
			.get(rank as usize)
			.copied()
			.ok_or(CoreError::InvalidRank(rank))
	}

	/// Upper-case label used in console output.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Debug => "DEBUG",
			Self::Info => "INFO",
			Self::Warn => "WARN",
			Self::Error => "ERROR",
			Self::Security => "SECURITY",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warn" | "warning" => Ok(Self::Warn),
			"error" => Ok(Self::Error),
			"security" => Ok(Self::Security),
			_ => Err(CoreError::InvalidLevel(s.to_string())),
		}
	}
}

impl Serialize for LogLevel {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u8(self.rank())
	}
}

impl<'de> Deserialize<'de> for LogLevel {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let rank = u8::deserialize(deserializer)?;
		LogLevel::from_rank(rank).map_err(serde::de::Error::custom)
	}
}
