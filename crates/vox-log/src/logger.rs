// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The structured logger.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;
use vox_log_config::{ConsoleMode, LoggerConfig};
use vox_log_core::{
	category, mask_sensitive_data, mask_value, sensitive_field_kind, ErrorDetails, LogEntry,
	LogLevel, Metadata, SensitiveKind, COMPLIANCE_TAG,
};

use crate::buffer::{LogBuffer, DEFAULT_CAPACITY};
use crate::clock::{Clock, SystemClock};
use crate::console::{ColoredConsole, ConsoleSink, NullConsole, TracingConsole};
use crate::debug_store::{
	persist_entries, DebugStore, FileDebugStore, MemoryDebugStore, DEFAULT_DEBUG_STORE_ENTRIES,
};
use crate::delivery::{DeliveryQueue, Enqueued, DEFAULT_QUEUE_CAPACITY};
use crate::error::LoggerError;
use crate::host::{HostEnvironment, HostEvent, ProcessHost};
use crate::transport::{HttpTransport, RemoteTransport};

/// Builder for constructing a [`Logger`].
pub struct LoggerBuilder {
	min_level: LogLevel,
	development: bool,
	buffer_capacity: usize,
	delivery_queue_capacity: usize,
	debug_store_entries: usize,
	clock: Arc<dyn Clock>,
	console: Arc<dyn ConsoleSink>,
	host: Arc<dyn HostEnvironment>,
	debug_store: Option<Arc<dyn DebugStore>>,
	transport: Option<Arc<dyn RemoteTransport>>,
	capture_panics: bool,
}

impl LoggerBuilder {
	/// Production defaults: INFO threshold, colored console, no remote transport.
	pub fn new() -> Self {
		Self {
			min_level: LogLevel::Info,
			development: false,
			buffer_capacity: DEFAULT_CAPACITY,
			delivery_queue_capacity: DEFAULT_QUEUE_CAPACITY,
			debug_store_entries: DEFAULT_DEBUG_STORE_ENTRIES,
			clock: Arc::new(SystemClock),
			console: Arc::new(ColoredConsole),
			host: Arc::new(ProcessHost::default()),
			debug_store: None,
			transport: None,
			capture_panics: false,
		}
	}

	/// Builder wired from resolved configuration: HTTP transport to the
	/// configured collector, console per `console` mode, a debug store in
	/// development mode, and panics recorded as uncaught errors.
	pub fn from_config(config: &LoggerConfig) -> Result<Self, LoggerError> {
		let console: Arc<dyn ConsoleSink> = match config.console {
			ConsoleMode::Colored => Arc::new(ColoredConsole),
			ConsoleMode::Tracing => Arc::new(TracingConsole),
			ConsoleMode::Off => Arc::new(NullConsole),
		};

		let transport: Option<Arc<dyn RemoteTransport>> = if config.remote_enabled {
			Some(Arc::new(HttpTransport::new(
				config.collector_url(),
				config.request_timeout,
			)?))
		} else {
			None
		};

		let debug_store: Option<Arc<dyn DebugStore>> = if config.mode.is_development() {
			match &config.debug_store_dir {
				Some(dir) => Some(Arc::new(FileDebugStore::new(dir))),
				None => Some(Arc::new(MemoryDebugStore::new())),
			}
		} else {
			None
		};

		Ok(Self {
			min_level: config.min_level,
			development: config.mode.is_development(),
			buffer_capacity: config.buffer_capacity,
			delivery_queue_capacity: config.delivery_queue_capacity,
			debug_store_entries: config.debug_store_entries,
			console,
			debug_store,
			transport,
			capture_panics: true,
			..Self::new()
		})
	}

	pub fn min_level(mut self, level: LogLevel) -> Self {
		self.min_level = level;
		self
	}

	/// Development mode enables debug-store persistence.
	pub fn development(mut self, development: bool) -> Self {
		self.development = development;
		self
	}

	pub fn buffer_capacity(mut self, capacity: usize) -> Self {
		self.buffer_capacity = capacity;
		self
	}

	pub fn delivery_queue_capacity(mut self, capacity: usize) -> Self {
		self.delivery_queue_capacity = capacity;
		self
	}

	pub fn debug_store_entries(mut self, count: usize) -> Self {
		self.debug_store_entries = count;
		self
	}

	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn console(mut self, console: Arc<dyn ConsoleSink>) -> Self {
		self.console = console;
		self
	}

	pub fn host(mut self, host: Arc<dyn HostEnvironment>) -> Self {
		self.host = host;
		self
	}

	pub fn debug_store(mut self, store: Arc<dyn DebugStore>) -> Self {
		self.debug_store = Some(store);
		self
	}

	pub fn transport(mut self, transport: Arc<dyn RemoteTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Routes process panics through the host's event stream so they are
	/// logged as uncaught errors. The panic hook is process-wide; the most
	/// recently built capturing logger receives panics.
	pub fn capture_panics(mut self, capture: bool) -> Self {
		self.capture_panics = capture;
		self
	}

	/// Builds the logger.
	///
	/// Remote delivery and host-event listening need a tokio runtime. Built
	/// outside one, the logger still prints and buffers but sends nothing.
	pub fn build(self) -> Logger {
		let runtime = tokio::runtime::Handle::try_current().ok();

		let delivery = match (self.transport, runtime.is_some()) {
			(Some(transport), true) => Some(DeliveryQueue::spawn(
				self.delivery_queue_capacity,
				transport,
				Arc::clone(&self.console),
			)),
			(Some(_), false) => {
				self
					.console
					.diagnostic("no async runtime available; remote log delivery disabled");
				None
			}
			(None, _) => None,
		};

		let host_events = self.host.subscribe();
		if self.capture_panics {
			self.host.install_panic_hook();
		}

		let inner = Arc::new(LoggerInner {
			min_level: self.min_level,
			development: self.development,
			session_id: Uuid::new_v4().to_string(),
			debug_store_entries: self.debug_store_entries,
			clock: self.clock,
			console: self.console,
			host: self.host,
			debug_store: self.debug_store,
			buffer: LogBuffer::new(self.buffer_capacity),
			delivery,
			state: Mutex::new(LoggerState::default()),
		});

		if let (Some(rx), Some(runtime)) = (host_events, runtime) {
			runtime.spawn(listen_host_events(Arc::downgrade(&inner), rx));
		}

		info!(
			session_id = %inner.session_id,
			min_level = %inner.min_level,
			remote = inner.delivery.is_some(),
			"Logger initialized"
		);

		Logger { inner }
	}
}

impl Default for LoggerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Default)]
struct LoggerState {
	user_id: Option<String>,
	last_timestamp: Option<DateTime<Utc>>,
}

struct LoggerInner {
	min_level: LogLevel,
	development: bool,
	session_id: String,
	debug_store_entries: usize,
	clock: Arc<dyn Clock>,
	console: Arc<dyn ConsoleSink>,
	host: Arc<dyn HostEnvironment>,
	debug_store: Option<Arc<dyn DebugStore>>,
	buffer: LogBuffer,
	delivery: Option<DeliveryQueue>,
	state: Mutex<LoggerState>,
}

/// Structured logger handle.
///
/// Cloning is cheap; all clones share one buffer, session and delivery queue.
/// No method returns an error or panics because of a sink failure: faults are
/// reported through the console sink's diagnostics and otherwise swallowed.
#[derive(Clone)]
pub struct Logger {
	inner: Arc<LoggerInner>,
}

impl Logger {
	pub fn builder() -> LoggerBuilder {
		LoggerBuilder::new()
	}

	pub fn from_config(config: &LoggerConfig) -> Result<Self, LoggerError> {
		Ok(LoggerBuilder::from_config(config)?.build())
	}

	pub fn session_id(&self) -> &str {
		&self.inner.session_id
	}

	pub fn min_level(&self) -> LogLevel {
		self.inner.min_level
	}

	/// Records an entry at any level and category. SECURITY entries always
	/// carry the compliance tag.
	pub fn log(
		&self,
		level: LogLevel,
		category: &str,
		message: impl Into<String>,
		metadata: Metadata,
	) {
		let compliance = (level == LogLevel::Security).then_some(COMPLIANCE_TAG);
		self.emit(level, category, message.into(), metadata, compliance);
	}

	pub fn debug(&self, message: impl Into<String>, metadata: Metadata) {
		self.log(LogLevel::Debug, category::GENERAL, message, metadata);
	}

	pub fn info(&self, message: impl Into<String>, metadata: Metadata) {
		self.log(LogLevel::Info, category::GENERAL, message, metadata);
	}

	pub fn warn(&self, message: impl Into<String>, metadata: Metadata) {
		self.log(LogLevel::Warn, category::GENERAL, message, metadata);
	}

	/// ERROR entry. The error's name, message and stack are flattened into
	/// metadata as `errorName`, `errorMessage` and `errorStack`.
	pub fn error(
		&self,
		message: impl Into<String>,
		error: Option<&ErrorDetails>,
		metadata: Metadata,
	) {
		let metadata = match error {
			Some(details) => metadata.merge(details.to_metadata()),
			None => metadata,
		};
		self.log(LogLevel::Error, category::ERROR, message, metadata);
	}

	pub fn security(&self, message: impl Into<String>, metadata: Metadata) {
		self.log(LogLevel::Security, category::SECURITY, message, metadata);
	}

	/// Sets the acting user for subsequent entries. Only the masked id is kept.
	pub fn set_user_id(&self, user_id: &str) {
		let masked = mask_sensitive_data(user_id, SensitiveKind::Default);
		self.inner.state.lock().user_id = (!masked.is_empty()).then(|| masked.clone());
		self.log(
			LogLevel::Info,
			category::AUTH,
			"User authenticated",
			Metadata::new().insert("userId", masked),
		);
	}

	/// Forgets the acting user.
	pub fn clear_user_id(&self) {
		let previous = self.inner.state.lock().user_id.take();
		if previous.is_some() {
			self.log(
				LogLevel::Info,
				category::AUTH,
				"User signed out",
				Metadata::new(),
			);
		}
	}

	pub fn user_action(&self, action: &str, element: Option<&str>, metadata: Metadata) {
		let details = Metadata::new()
			.insert("action", action)
			.insert_opt("element", element)
			.insert("timestamp", self.now_rfc3339());
		self.log(
			LogLevel::Info,
			category::USER_INTERACTION,
			format!("User action: {action}"),
			metadata.merge(details),
		);
	}

	pub fn api_call(
		&self,
		method: &str,
		url: &str,
		status: Option<u16>,
		duration: Option<Duration>,
		metadata: Metadata,
	) {
		let method = method.to_ascii_uppercase();
		let details = Metadata::new()
			.insert("method", method.clone())
			.insert("url", url)
			.insert_opt("status", status)
			.insert_opt(
				"duration",
				duration.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
			);
		self.log(
			LogLevel::Info,
			category::API,
			format!("API {method} {url}"),
			metadata.merge(details),
		);
	}

	/// Records a named metric in milliseconds.
	pub fn performance(&self, metric: &str, value: f64, metadata: Metadata) {
		let details = Metadata::new()
			.insert("metric", metric)
			.insert("value", value)
			.insert("unit", "ms");
		self.log(
			LogLevel::Info,
			category::PERFORMANCE,
			format!("Performance: {metric}"),
			metadata.merge(details),
		);
	}

	/// SECURITY entry recording an action on categories of sensitive data.
	pub fn sensitive_data(&self, action: &str, data_types: &[&str], metadata: Metadata) {
		let details = Metadata::new()
			.insert("action", action)
			.insert("dataTypes", data_types.to_vec());
		self.emit(
			LogLevel::Security,
			category::SENSITIVE_DATA,
			format!("Sensitive data {action}"),
			metadata.merge(details),
			Some(COMPLIANCE_TAG),
		);
	}

	/// INFO entry for a form interaction. Fields with a known sensitive name
	/// are masked; other fields are recorded as given.
	pub fn form_interaction(
		&self,
		form_id: &str,
		action: &str,
		fields: Option<&Metadata>,
		metadata: Metadata,
	) {
		let masked: Option<Metadata> = fields.map(|fields| {
			fields
				.iter()
				.map(|(name, value)| {
					let value = match sensitive_field_kind(name) {
						Some(kind) => mask_value(value, kind),
						None => value.clone(),
					};
					(name.clone(), value)
				})
				.collect()
		});

		let details = Metadata::new()
			.insert("formId", form_id)
			.insert("action", action)
			.insert_opt("fieldCount", masked.as_ref().map(|m| m.len()))
			.insert_opt("fields", masked);
		self.log(
			LogLevel::Info,
			category::FORM_INTERACTION,
			format!("Form {action}: {form_id}"),
			metadata.merge(details),
		);
	}

	/// Records a host event the way the built-in host listener does.
	pub fn handle_host_event(&self, event: HostEvent) {
		match event {
			HostEvent::UncaughtError {
				message,
				filename,
				line,
				column,
				stack,
			} => self.log(
				LogLevel::Error,
				category::ERROR,
				format!("Uncaught error: {message}"),
				Metadata::new()
					.insert_opt("filename", filename)
					.insert_opt("line", line)
					.insert_opt("column", column)
					.insert_opt("stack", stack),
			),
			HostEvent::UnhandledRejection { reason } => self.log(
				LogLevel::Error,
				category::ERROR,
				"Unhandled rejection",
				Metadata::new().insert("reason", reason),
			),
			HostEvent::VisibilityChange { state } => self.log(
				LogLevel::Info,
				category::PAGE_VISIBILITY,
				"Page visibility changed",
				Metadata::new().insert("visibilityState", state.to_string()),
			),
		}
	}

	/// The last `count` buffered entries, oldest first.
	pub fn get_recent_logs(&self, count: usize) -> Vec<LogEntry> {
		self.inner.buffer.recent(count)
	}

	/// Buffered entries at or above `level`, oldest first.
	pub fn logs_at_or_above(&self, level: LogLevel) -> Vec<LogEntry> {
		self.inner.buffer.at_or_above(level)
	}

	/// The whole buffer as a pretty-printed JSON array.
	pub fn export_logs(&self) -> String {
		let entries = self.inner.buffer.snapshot();
		match serde_json::to_string_pretty(&entries) {
			Ok(json) => json,
			Err(e) => {
				self
					.inner
					.console
					.diagnostic(&format!("failed to export logs: {e}"));
				"[]".to_string()
			}
		}
	}

	/// Empties the buffer. Entries already sent to the collector are unaffected.
	pub fn clear_logs(&self) {
		self.inner.buffer.clear();
	}

	/// Live stream of entries as they are buffered.
	pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
		self.inner.buffer.subscribe()
	}

	/// Waits until every entry queued for delivery so far has been attempted.
	pub async fn flush(&self) {
		if let Some(delivery) = &self.inner.delivery {
			delivery.flush().await;
		}
	}

	/// Drains outstanding deliveries and stops the delivery worker. Later
	/// entries are still printed and buffered.
	pub async fn shutdown(&self) {
		if let Some(delivery) = &self.inner.delivery {
			delivery.shutdown().await;
		}
	}

	fn now_rfc3339(&self) -> String {
		self
			.inner
			.clock
			.now()
			.to_rfc3339_opts(SecondsFormat::Millis, true)
	}

	fn emit(
		&self,
		level: LogLevel,
		category: &str,
		message: String,
		metadata: Metadata,
		compliance: Option<&str>,
	) {
		let inner = &self.inner;
		if level < inner.min_level {
			return;
		}

		// Console, buffer and debug-store writes happen under the state lock so
		// all of them see entries in the same order as their timestamps.
		let entry = {
			let mut state = inner.state.lock();
			let now = inner.clock.now();
			let timestamp = match state.last_timestamp {
				Some(last) if now < last => last,
				_ => now,
			};
			state.last_timestamp = Some(timestamp);

			let mut entry = LogEntry::new(timestamp, level, category, message);
			entry.user_id = state.user_id.clone();
			entry.session_id = Some(inner.session_id.clone());
			entry.user_agent = inner.host.user_agent();
			entry.url = inner.host.current_url();
			entry.metadata = metadata;
			entry.compliance = compliance.map(str::to_string);

			inner.console.write(&entry);
			inner.buffer.push(entry.clone());
			self.persist_for_debugging();
			entry
		};

		if entry.is_remote_eligible() {
			self.deliver(entry);
		}
	}

	/// Called with the state lock held so the newest snapshot is always the
	/// last one written.
	fn persist_for_debugging(&self) {
		let inner = &self.inner;
		if !inner.development {
			return;
		}
		let Some(store) = &inner.debug_store else {
			return;
		};

		let recent = inner.buffer.recent(inner.debug_store_entries);
		if let Err(e) = persist_entries(store.as_ref(), &recent) {
			debug!(error = %e, "failed to persist debug logs");
		}
	}

	fn deliver(&self, entry: LogEntry) {
		let Some(delivery) = &self.inner.delivery else {
			return;
		};

		match delivery.enqueue(entry) {
			Enqueued::Queued => {}
			Enqueued::DroppedFull => self
				.inner
				.console
				.diagnostic("log delivery queue is full; entry kept locally only"),
			Enqueued::Closed => debug!("log delivery stopped; entry kept locally only"),
		}
	}
}

async fn listen_host_events(inner: Weak<LoggerInner>, mut rx: broadcast::Receiver<HostEvent>) {
	loop {
		match rx.recv().await {
			Ok(event) => {
				let Some(inner) = inner.upgrade() else {
					break;
				};
				Logger { inner }.handle_host_event(event);
			}
			Err(broadcast::error::RecvError::Lagged(skipped)) => {
				debug!(skipped, "host event listener lagged");
			}
			Err(broadcast::error::RecvError::Closed) => break,
		}
	}
}
