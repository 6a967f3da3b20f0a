// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flattened error information for ERROR entries.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// Name, message and stack of an error, ready to be merged into entry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
	pub name: String,
	pub message: String,
	pub stack: Option<String>,
}

impl ErrorDetails {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			stack: None,
		}
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	/// Captures an error's type name and display text. The `source()` chain,
	/// one cause per line, stands in for the stack.
	pub fn from_error<E>(error: &E) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		let full = std::any::type_name::<E>();
		let name = full
			.split('<')
			.next()
			.unwrap_or(full)
			.rsplit("::")
			.next()
			.unwrap_or("Error")
			.to_string();

		let mut causes = Vec::new();
		let mut source = error.source();
		while let Some(cause) = source {
			causes.push(format!("caused by: {cause}"));
			source = cause.source();
		}

		Self {
			name,
			message: error.to_string(),
			stack: (!causes.is_empty()).then(|| causes.join("\n")),
		}
	}

	/// Metadata keys `errorName`, `errorMessage` and (if known) `errorStack`.
	pub fn to_metadata(&self) -> Metadata {
		Metadata::new()
			.insert("errorName", self.name.clone())
			.insert("errorMessage", self.message.clone())
			.insert_opt("errorStack", self.stack.clone())
	}
}
