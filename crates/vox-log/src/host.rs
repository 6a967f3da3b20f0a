// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host environment integration.
//!
//! The host supplies the context stamped on every entry (user agent, current
//! URL) and a stream of process-level events the logger records on its own:
//! uncaught errors, unhandled rejections and visibility changes.

use std::fmt;
use std::sync::Once;

use parking_lot::RwLock;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

static PANIC_HOOK: Once = Once::new();

/// Where the process panic hook sends events. The most recent host to call
/// [`HostEnvironment::install_panic_hook`] receives them.
static PANIC_EVENTS: RwLock<Option<broadcast::Sender<HostEvent>>> = RwLock::new(None);

/// Serializes tests that install the panic hook and then panic.
#[cfg(test)]
pub(crate) static PANIC_HOOK_TEST_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
	Visible,
	Hidden,
}

impl fmt::Display for VisibilityState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Visible => write!(f, "visible"),
			Self::Hidden => write!(f, "hidden"),
		}
	}
}

/// A process-level event raised by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
	UncaughtError {
		message: String,
		filename: Option<String>,
		line: Option<u32>,
		column: Option<u32>,
		stack: Option<String>,
	},
	UnhandledRejection {
		reason: String,
	},
	VisibilityChange {
		state: VisibilityState,
	},
}

/// What the logger needs from its host.
pub trait HostEnvironment: Send + Sync {
	fn user_agent(&self) -> Option<String>;

	fn current_url(&self) -> Option<String>;

	/// Event stream the logger listens on for its whole lifetime. `None` when
	/// the host raises no events.
	fn subscribe(&self) -> Option<broadcast::Receiver<HostEvent>>;

	/// Reports process panics as [`HostEvent::UncaughtError`] on this host's
	/// event stream. Hosts without one ignore the request.
	fn install_panic_hook(&self) {}
}

fn install_process_panic_hook() {
	PANIC_HOOK.call_once(|| {
		let previous = std::panic::take_hook();
		std::panic::set_hook(Box::new(move |info| {
			if let Some(events) = PANIC_EVENTS.read().as_ref() {
				let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
					(*s).to_string()
				} else if let Some(s) = info.payload().downcast_ref::<String>() {
					s.clone()
				} else {
					"panic".to_string()
				};

				let backtrace = std::backtrace::Backtrace::capture();
				let stack = match backtrace.status() {
					std::backtrace::BacktraceStatus::Captured => Some(backtrace.to_string()),
					_ => None,
				};

				let _ = events.send(HostEvent::UncaughtError {
					message,
					filename: info.location().map(|l| l.file().to_string()),
					line: info.location().map(|l| l.line()),
					column: info.location().map(|l| l.column()),
					stack,
				});
			}

			previous(info);
		}));
	});
}

/// Host backed by the running process.
///
/// Events are raised with [`ProcessHost::emit`]. Installing the panic hook
/// additionally reports panics as uncaught errors.
pub struct ProcessHost {
	user_agent: String,
	url: RwLock<Option<String>>,
	events: broadcast::Sender<HostEvent>,
}

impl ProcessHost {
	pub fn new(user_agent: impl Into<String>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
		Self {
			user_agent: user_agent.into(),
			url: RwLock::new(None),
			events,
		}
	}

	/// Sets the URL stamped on subsequent entries.
	pub fn set_url(&self, url: impl Into<String>) {
		*self.url.write() = Some(url.into());
	}

	pub fn emit(&self, event: HostEvent) {
		// No listener yet is fine
		let _ = self.events.send(event);
	}

	pub fn report_rejection(&self, reason: impl Into<String>) {
		self.emit(HostEvent::UnhandledRejection {
			reason: reason.into(),
		});
	}

	pub fn report_visibility(&self, state: VisibilityState) {
		self.emit(HostEvent::VisibilityChange { state });
	}
}

impl Default for ProcessHost {
	fn default() -> Self {
		Self::new(crate::http::user_agent())
	}
}

impl HostEnvironment for ProcessHost {
	fn user_agent(&self) -> Option<String> {
		Some(self.user_agent.clone())
	}

	fn current_url(&self) -> Option<String> {
		self.url.read().clone()
	}

	fn subscribe(&self) -> Option<broadcast::Receiver<HostEvent>> {
		Some(self.events.subscribe())
	}

	/// Chains a process-wide panic hook once, then points it at this host.
	/// A later call from another host takes over.
	fn install_panic_hook(&self) {
		install_process_panic_hook();
		*PANIC_EVENTS.write() = Some(self.events.clone());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_context_values() {
		let host = ProcessHost::new("test-agent/1.0");
		assert_eq!(host.user_agent().as_deref(), Some("test-agent/1.0"));
		assert_eq!(host.current_url(), None);

		host.set_url("https://vox.example.org/record");
		assert_eq!(
			host.current_url().as_deref(),
			Some("https://vox.example.org/record")
		);
	}

	#[tokio::test]
	async fn test_events_reach_subscribers() {
		let host = ProcessHost::new("test-agent/1.0");
		let mut rx = host.subscribe().unwrap();

		host.report_visibility(VisibilityState::Hidden);
		host.report_rejection("fetch aborted");

		assert_eq!(
			rx.recv().await.unwrap(),
			HostEvent::VisibilityChange {
				state: VisibilityState::Hidden
			}
		);
		assert_eq!(
			rx.recv().await.unwrap(),
			HostEvent::UnhandledRejection {
				reason: "fetch aborted".to_string()
			}
		);
	}

	#[test]
	fn test_default_host_uses_library_user_agent() {
		let host = ProcessHost::default();
		assert!(host.user_agent().unwrap().starts_with("vox-log/"));
	}

	#[test]
	fn test_panic_hook_follows_latest_host() {
		let _serial = PANIC_HOOK_TEST_LOCK.lock();
		let first = ProcessHost::new("first/1.0");
		let second = ProcessHost::new("second/1.0");
		let mut first_rx = first.subscribe().unwrap();
		let mut second_rx = second.subscribe().unwrap();

		first.install_panic_hook();
		second.install_panic_hook();
		let _ = std::panic::catch_unwind(|| panic!("microphone unavailable"));

		let panics = |rx: &mut broadcast::Receiver<HostEvent>| {
			std::iter::from_fn(|| rx.try_recv().ok())
				.filter_map(|event| match event {
					HostEvent::UncaughtError {
						message, filename, ..
					} if message == "microphone unavailable" => filename,
					_ => None,
				})
				.collect::<Vec<_>>()
		};

		assert!(panics(&mut first_rx).is_empty());
		let seen = panics(&mut second_rx);
		assert_eq!(seen.len(), 1);
		assert!(seen[0].ends_with("host.rs"));
	}
}
