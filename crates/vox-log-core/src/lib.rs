// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Vox structured logger.
//!
//! This crate provides the pieces shared by the logger runtime and anything
//! that reads its output (collectors, exported log files):
//! - [`LogLevel`] - ordered severity rank, serialized as a number
//! - [`LogEntry`] - one immutable record of a logging call
//! - [`Metadata`] - ordered, JSON-typed key/value bag carried on entries
//! - [`ErrorDetails`] - flattened name/message/stack of an error
//! - [`mask_sensitive_data`] - deterministic partial redaction by field kind

pub mod category;
pub mod entry;
pub mod error;
pub mod error_details;
pub mod level;
pub mod mask;
pub mod metadata;

pub use entry::{LogEntry, COMPLIANCE_TAG};
pub use error::{CoreError, Result};
pub use error_details::ErrorDetails;
pub use level::LogLevel;
pub use mask::{
	mask_optional, mask_sensitive_data, mask_value, sensitive_field_kind, SensitiveKind,
	MASK_FILL, PASSWORD_MASK, REDACTED,
};
pub use metadata::Metadata;
