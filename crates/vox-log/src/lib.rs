// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured logger for the Vox voice-data platform.
//!
//! Every call produces one [`LogEntry`] that is written to the console sink,
//! kept in a bounded in-memory buffer, persisted to a debug store in
//! development, and sent to the remote collector when it is WARN or above or
//! carries a compliance tag. Remote delivery is fire-and-forget.
//!
//! ```no_run
//! use vox_log::{Logger, Metadata};
//!
//! # async fn run() -> Result<(), vox_log::LoggerError> {
//! let config = vox_log_config::load_config()?;
//! let logger = Logger::from_config(&config)?;
//! logger.info("Recording saved", Metadata::new().insert("durationMs", 4200));
//! logger.flush().await;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod clock;
pub mod console;
pub mod debug_store;
pub mod delivery;
pub mod error;
pub mod host;
pub mod http;
pub mod logger;
pub mod transport;

pub use buffer::LogBuffer;
pub use clock::{Clock, SystemClock};
pub use console::{ColoredConsole, ConsoleSink, MemoryConsole, NullConsole, TracingConsole};
pub use debug_store::{DebugStore, FileDebugStore, MemoryDebugStore, DEBUG_STORE_KEY};
pub use delivery::{DeliveryQueue, Enqueued};
pub use error::{DebugStoreError, DeliveryError, LoggerError};
pub use host::{HostEnvironment, HostEvent, ProcessHost, VisibilityState};
pub use logger::{Logger, LoggerBuilder};
pub use transport::{HttpTransport, RemoteTransport};

pub use vox_log_core::{
	category, mask_sensitive_data, ErrorDetails, LogEntry, LogLevel, Metadata, SensitiveKind,
	COMPLIANCE_TAG,
};
