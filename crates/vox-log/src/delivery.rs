// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fire-and-forget delivery of entries to the remote collector.
//!
//! Logging calls hand entries to a bounded queue with `try_send` and return
//! immediately. A background task drains the queue and spawns one delivery per
//! entry, so a stalled request never holds up the ones behind it. Completion
//! order is therefore not the order entries were logged. There is no retry:
//! a failed delivery is reported once through the console diagnostics and
//! dropped.
//!
//! Flush and shutdown requests never stall the worker. Each one records the
//! sequence number of the next delivery and is acked once no earlier delivery
//! is still running, while the worker keeps accepting new entries.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info};
use vox_log_core::LogEntry;

use crate::console::ConsoleSink;
use crate::transport::RemoteTransport;

/// Default delivery queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

enum DeliveryCommand {
	Deliver(Box<LogEntry>),
	/// Ack once every delivery dispatched so far has completed.
	Flush(oneshot::Sender<()>),
	Shutdown(oneshot::Sender<()>),
}

/// Outcome of handing an entry to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
	Queued,
	/// Queue at capacity; the entry is not delivered.
	DroppedFull,
	/// Worker has stopped.
	Closed,
}

type Outstanding = Arc<Mutex<BTreeSet<u64>>>;

/// Removes a delivery from the outstanding set when its task ends, including
/// by panic.
struct Completion {
	seq: u64,
	outstanding: Outstanding,
}

impl Drop for Completion {
	fn drop(&mut self) {
		self.outstanding.lock().remove(&self.seq);
	}
}

/// A pending flush or shutdown ack, released once every delivery with a
/// sequence number below `watermark` has finished.
struct Waiter {
	watermark: u64,
	ack: oneshot::Sender<()>,
}

fn release_waiters(outstanding: &Outstanding, waiters: &mut Vec<Waiter>) {
	if waiters.is_empty() {
		return;
	}
	let oldest = outstanding.lock().first().copied();
	let (done, pending): (Vec<Waiter>, Vec<Waiter>) = std::mem::take(waiters)
		.into_iter()
		.partition(|w| oldest.map_or(true, |seq| seq >= w.watermark));
	*waiters = pending;
	for waiter in done {
		let _ = waiter.ack.send(());
	}
}

/// Handle to the background delivery worker.
#[derive(Clone)]
pub struct DeliveryQueue {
	tx: mpsc::Sender<DeliveryCommand>,
}

impl DeliveryQueue {
	/// Spawns the worker on the current tokio runtime.
	///
	/// Must be called from within a runtime.
	pub fn spawn(
		capacity: usize,
		transport: Arc<dyn RemoteTransport>,
		console: Arc<dyn ConsoleSink>,
	) -> Self {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		tokio::spawn(Self::background_task(rx, transport, console));
		Self { tx }
	}

	async fn background_task(
		mut rx: mpsc::Receiver<DeliveryCommand>,
		transport: Arc<dyn RemoteTransport>,
		console: Arc<dyn ConsoleSink>,
	) {
		let mut in_flight = JoinSet::new();
		let outstanding: Outstanding = Arc::new(Mutex::new(BTreeSet::new()));
		let mut waiters: Vec<Waiter> = Vec::new();
		let mut next_seq: u64 = 0;
		let mut receiving = true;

		loop {
			tokio::select! {
				command = rx.recv(), if receiving => match command {
					Some(DeliveryCommand::Deliver(entry)) => {
						let seq = next_seq;
						next_seq += 1;
						outstanding.lock().insert(seq);
						let completion = Completion {
							seq,
							outstanding: Arc::clone(&outstanding),
						};
						let transport = Arc::clone(&transport);
						let console = Arc::clone(&console);
						in_flight.spawn(async move {
							let _completion = completion;
							if let Err(e) = transport.deliver(&entry).await {
								console.diagnostic(&format!(
									"failed to deliver log entry '{}' to collector: {e}",
									entry.message
								));
							}
						});
					}
					Some(DeliveryCommand::Flush(ack)) => {
						waiters.push(Waiter { watermark: next_seq, ack });
					}
					Some(DeliveryCommand::Shutdown(ack)) => {
						rx.close();
						receiving = false;
						waiters.push(Waiter { watermark: next_seq, ack });
					}
					None => receiving = false,
				},
				joined = in_flight.join_next(), if !in_flight.is_empty() => {
					if let Some(Err(e)) = joined {
						console.diagnostic(&format!("log delivery task failed: {e}"));
					}
				}
				else => break,
			}

			release_waiters(&outstanding, &mut waiters);

			if !receiving && in_flight.is_empty() {
				break;
			}
		}

		info!("log delivery worker stopped");
	}

	/// Queues an entry without waiting.
	pub fn enqueue(&self, entry: LogEntry) -> Enqueued {
		match self.tx.try_send(DeliveryCommand::Deliver(Box::new(entry))) {
			Ok(()) => Enqueued::Queued,
			Err(mpsc::error::TrySendError::Full(_)) => Enqueued::DroppedFull,
			Err(mpsc::error::TrySendError::Closed(_)) => Enqueued::Closed,
		}
	}

	/// Waits until everything queued before this call has been attempted.
	pub async fn flush(&self) {
		let (ack, done) = oneshot::channel();
		if self.tx.send(DeliveryCommand::Flush(ack)).await.is_err() {
			return;
		}
		let _ = done.await;
	}

	/// Drains outstanding deliveries and stops the worker.
	pub async fn shutdown(&self) {
		let (ack, done) = oneshot::channel();
		if self.tx.send(DeliveryCommand::Shutdown(ack)).await.is_err() {
			debug!("log delivery worker already stopped");
			return;
		}
		let _ = done.await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::console::MemoryConsole;
	use crate::error::DeliveryError;
	use async_trait::async_trait;
	use chrono::Utc;
	use std::time::Duration;
	use vox_log_core::LogLevel;

	#[derive(Default)]
	struct RecordingTransport {
		delivered: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl RemoteTransport for RecordingTransport {
		async fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError> {
			if entry.message == "hang" {
				std::future::pending::<()>().await;
			}
			if entry.message == "panic" {
				panic!("transport bug");
			}
			if entry.message == "fail" {
				return Err(DeliveryError::ServerError {
					status: 500,
					message: "mock failure".to_string(),
				});
			}
			self.delivered.lock().push(entry.message.clone());
			Ok(())
		}
	}

	fn entry(message: &str) -> LogEntry {
		LogEntry::new(Utc::now(), LogLevel::Warn, "GENERAL", message)
	}

	#[tokio::test]
	async fn test_enqueue_and_flush_delivers() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console);

		assert_eq!(queue.enqueue(entry("one")), Enqueued::Queued);
		assert_eq!(queue.enqueue(entry("two")), Enqueued::Queued);
		queue.flush().await;

		let mut delivered = transport.delivered.lock().clone();
		delivered.sort();
		assert_eq!(delivered, vec!["one", "two"]);
	}

	#[tokio::test]
	async fn test_failure_is_reported_as_diagnostic() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console.clone());

		queue.enqueue(entry("fail"));
		queue.flush().await;

		let diagnostics = console.diagnostics();
		assert_eq!(diagnostics.len(), 1);
		assert!(diagnostics[0].contains("collector error (500)"));
		assert!(console.lines().is_empty());
	}

	#[tokio::test]
	async fn test_hung_delivery_does_not_block_others() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console);

		queue.enqueue(entry("hang"));
		queue.enqueue(entry("after"));

		tokio::time::timeout(Duration::from_secs(2), async {
			loop {
				if transport.delivered.lock().contains(&"after".to_string()) {
					break;
				}
				tokio::time::sleep(Duration::from_millis(5)).await;
			}
		})
		.await
		.expect("delivery behind a hung request should complete");
	}

	#[tokio::test]
	async fn test_pending_flush_does_not_stall_later_deliveries() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console);

		queue.enqueue(entry("hang"));
		let flushing = {
			let queue = queue.clone();
			tokio::spawn(async move { queue.flush().await })
		};
		tokio::time::sleep(Duration::from_millis(20)).await;

		for i in 0..20 {
			assert_eq!(queue.enqueue(entry(&format!("after {i}"))), Enqueued::Queued);
			tokio::time::sleep(Duration::from_millis(1)).await;
		}

		tokio::time::timeout(Duration::from_secs(2), async {
			while transport.delivered.lock().len() < 20 {
				tokio::time::sleep(Duration::from_millis(5)).await;
			}
		})
		.await
		.expect("deliveries after a pending flush should complete");

		assert!(!flushing.is_finished());
		flushing.abort();
	}

	#[tokio::test]
	async fn test_flush_waits_only_for_earlier_deliveries() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console);

		queue.enqueue(entry("one"));
		let (ack, done) = oneshot::channel();
		queue.tx.try_send(DeliveryCommand::Flush(ack)).unwrap();
		queue.enqueue(entry("hang"));

		tokio::time::timeout(Duration::from_secs(2), done)
			.await
			.expect("flush should not wait for later deliveries")
			.unwrap();
		assert_eq!(transport.delivered.lock().clone(), vec!["one"]);
	}

	#[tokio::test]
	async fn test_panicking_delivery_still_releases_flush() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console.clone());

		queue.enqueue(entry("panic"));
		queue.enqueue(entry("fine"));
		tokio::time::timeout(Duration::from_secs(2), queue.flush())
			.await
			.expect("flush should complete after a panicked delivery");

		assert_eq!(transport.delivered.lock().clone(), vec!["fine"]);
		assert!(console
			.diagnostics()
			.iter()
			.any(|d| d.contains("log delivery task failed")));
	}

	#[tokio::test]
	async fn test_enqueue_after_shutdown_is_closed() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(8, transport.clone(), console);

		queue.enqueue(entry("before"));
		queue.shutdown().await;

		assert_eq!(transport.delivered.lock().clone(), vec!["before"]);
		assert_eq!(queue.enqueue(entry("late")), Enqueued::Closed);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn test_full_queue_drops_newest() {
		let transport = Arc::new(RecordingTransport::default());
		let console = Arc::new(MemoryConsole::new());
		let queue = DeliveryQueue::spawn(1, transport, console);

		// The worker has not run yet on this single-threaded runtime.
		assert_eq!(queue.enqueue(entry("first")), Enqueued::Queued);
		assert_eq!(queue.enqueue(entry("second")), Enqueued::DroppedFull);
	}
}
