// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the refresh coordinator.
///
/// `attempts`, `successes`, and `failures` count refresh exchanges sent to the server.
/// `subscriptions` counts calls that queued behind an outstanding refresh and `replays`
/// counts calls whose credential had already been replaced, so they retried without one.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	subscriptions: AtomicU64,
	replays: AtomicU64,
}
impl RefreshMetrics {
	/// Refresh exchanges sent.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Exchanges that produced a new credential pair.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Exchanges that ended the session.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Calls that waited on another call's refresh.
	pub fn subscriptions(&self) -> u64 {
		self.subscriptions.load(Ordering::Relaxed)
	}

	/// Calls that replayed with an already refreshed credential.
	pub fn replays(&self) -> u64 {
		self.replays.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_subscription(&self) {
		self.subscriptions.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replay(&self) {
		self.replays.fetch_add(1, Ordering::Relaxed);
	}
}
