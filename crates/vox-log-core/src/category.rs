// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Well-known entry categories.

pub const GENERAL: &str = "GENERAL";
pub const AUTH: &str = "AUTH";
pub const USER_INTERACTION: &str = "USER_INTERACTION";
pub const API: &str = "API";
pub const PERFORMANCE: &str = "PERFORMANCE";
pub const FORM_INTERACTION: &str = "FORM_INTERACTION";
pub const SENSITIVE_DATA: &str = "SENSITIVE_DATA";
pub const SECURITY: &str = "SECURITY";
pub const ERROR: &str = "ERROR";
pub const PAGE_VISIBILITY: &str = "PAGE_VISIBILITY";
