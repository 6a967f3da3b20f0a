// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	#[error("invalid log level: {0}")]
	InvalidLevel(String),

	#[error("invalid log level rank: {0}")]
	InvalidRank(u8),
}
