// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial redaction of sensitive values.
//!
//! Masking keeps just enough of a value to recognise its shape in a log line
//! (the domain of an email, the last digits of a card) without letting the
//! original be reconstructed. Every rule is a pure function of the input, so
//! the same value always masks to the same output.
//!
//! Absent and empty values pass through untouched. A log reader can then tell
//! "field omitted" apart from "field present but redacted"; callers that must
//! not log a field at all check for presence themselves.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Replacement for values that are fully hidden.
pub const REDACTED: &str = "[REDACTED]";

/// Fixed-length replacement for passwords, independent of input length.
pub const PASSWORD_MASK: &str = "********";

/// Filler standing in for the hidden middle of a partially masked value.
pub const MASK_FILL: &str = "****";

/// Semantic kind of a value, selecting its masking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitiveKind {
	Password,
	Email,
	Phone,
	Age,
	Ssn,
	CreditCard,
	Default,
}

impl SensitiveKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Password => "password",
			Self::Email => "email",
			Self::Phone => "phone",
			Self::Age => "age",
			Self::Ssn => "ssn",
			Self::CreditCard => "creditCard",
			Self::Default => "default",
		}
	}
}

impl fmt::Display for SensitiveKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parsing never fails: unknown kind names fall back to [`SensitiveKind::Default`].
impl FromStr for SensitiveKind {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match normalize(s).as_str() {
			"password" => Self::Password,
			"email" => Self::Email,
			"phone" => Self::Phone,
			"age" => Self::Age,
			"ssn" => Self::Ssn,
			"creditcard" => Self::CreditCard,
			_ => Self::Default,
		})
	}
}

/// Masks `value` according to `kind`. Empty input is returned unchanged.
pub fn mask_sensitive_data(value: &str, kind: SensitiveKind) -> String {
	if value.is_empty() {
		return String::new();
	}

	match kind {
		SensitiveKind::Password => PASSWORD_MASK.to_string(),
		SensitiveKind::Email => mask_email(value),
		SensitiveKind::Phone => mask_phone(value),
		SensitiveKind::Age => REDACTED.to_string(),
		SensitiveKind::Ssn | SensitiveKind::CreditCard => mask_last_four(value),
		SensitiveKind::Default => mask_default(value),
	}
}

/// Like [`mask_sensitive_data`] but with `None` passing through as `None`.
pub fn mask_optional(value: Option<&str>, kind: SensitiveKind) -> Option<String> {
	value.map(|v| mask_sensitive_data(v, kind))
}

/// Masks a JSON value. `null` passes through; scalars are masked through
/// their textual form; arrays and objects are masked element by element.
pub fn mask_value(value: &Value, kind: SensitiveKind) -> Value {
	match value {
		Value::Null => Value::Null,
		Value::String(s) => Value::String(mask_sensitive_data(s, kind)),
		Value::Number(n) => Value::String(mask_sensitive_data(&n.to_string(), kind)),
		Value::Bool(b) => Value::String(mask_sensitive_data(&b.to_string(), kind)),
		Value::Array(items) => Value::Array(items.iter().map(|v| mask_value(v, kind)).collect()),
		Value::Object(map) => Value::Object(
			map
				.iter()
				.map(|(k, v)| (k.clone(), mask_value(v, kind)))
				.collect(),
		),
	}
}

/// Returns the masking kind for a form field name, if the name is sensitive.
///
/// Names are compared case-insensitively with `_`, `-` and spaces removed, so
/// `credit_card`, `Credit-Card` and `creditCard` all match.
pub fn sensitive_field_kind(field_name: &str) -> Option<SensitiveKind> {
	match normalize(field_name).as_str() {
		"password" => Some(SensitiveKind::Password),
		"email" => Some(SensitiveKind::Email),
		"phone" | "phonenumber" => Some(SensitiveKind::Phone),
		"age" => Some(SensitiveKind::Age),
		"ssn" | "socialsecurity" | "socialsecuritynumber" => Some(SensitiveKind::Ssn),
		"creditcard" | "cardnumber" => Some(SensitiveKind::CreditCard),
		_ => None,
	}
}

fn normalize(name: &str) -> String {
	name
		.chars()
		.filter(|c| !matches!(c, '_' | '-' | ' '))
		.flat_map(char::to_lowercase)
		.collect()
}

fn head(value: &str, n: usize) -> String {
	value.chars().take(n).collect()
}

fn tail(value: &str, n: usize) -> String {
	let len = value.chars().count();
	value.chars().skip(len.saturating_sub(n)).collect()
}

fn mask_email(value: &str) -> String {
	let Some((local, domain)) = value.split_once('@') else {
		return mask_default(value);
	};

	let labels: Vec<&str> = domain.split('.').collect();
	let last = labels.len() - 1;
	let masked_domain = labels
		.iter()
		.enumerate()
		.map(|(i, label)| if i == last { *label } else { MASK_FILL })
		.collect::<Vec<_>>()
		.join(".");

	format!("{}{MASK_FILL}@{masked_domain}", head(local, 2))
}

fn mask_phone(value: &str) -> String {
	match value.chars().count() {
		n if n > 7 => format!("{}{MASK_FILL}{}", head(value, 3), tail(value, 4)),
		n if n > 4 => format!("{}{MASK_FILL}{}", head(value, 2), tail(value, 2)),
		_ => MASK_FILL.to_string(),
	}
}

fn mask_last_four(value: &str) -> String {
	if value.chars().count() > 4 {
		format!("{MASK_FILL}{}", tail(value, 4))
	} else {
		REDACTED.to_string()
	}
}

fn mask_default(value: &str) -> String {
	if value.chars().count() > 4 {
		format!("{}{MASK_FILL}", head(value, 2))
	} else {
		REDACTED.to_string()
	}
}
