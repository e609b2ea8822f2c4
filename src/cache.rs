//! Short-lived read cache keyed by request fingerprint.
//!
//! Entries carry the monotonic instant they were captured at, so freshness never moves
//! backwards when the wall clock does. Expired entries are evicted lazily by the lookup
//! that observes them.

// std
use std::time::{Duration as StdDuration, Instant};
// self
use crate::_prelude::*;

/// Deterministic key derived from a normalized path and a canonical parameter set.
///
/// The parameter set is rendered as a JSON object with sorted keys, so two reads that only
/// differ in parameter order share one fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);
impl Fingerprint {
	pub(crate) fn new(path: &str, params: &BTreeMap<String, Value>) -> Self {
		let params = serde_json::to_string(params).unwrap_or_else(|_| "{}".into());

		Self(format!("{}{params}", path.trim()))
	}

	/// Returns the fingerprint string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for Fingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Cached response payload and the instant it was captured.
#[derive(Clone, Debug)]
pub struct CacheEntry {
	/// Decoded response body.
	pub payload: Value,
	/// Monotonic capture instant.
	pub captured_at: Instant,
}
impl CacheEntry {
	/// Returns `true` while the entry is younger than `ttl` at `now`.
	pub fn is_fresh_at(&self, ttl: StdDuration, now: Instant) -> bool {
		now.saturating_duration_since(self.captured_at) < ttl
	}
}

/// Fingerprint-keyed response cache with a fixed time-to-live.
#[derive(Debug)]
pub struct ResponseCache {
	ttl: StdDuration,
	entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
}
impl ResponseCache {
	/// Creates an empty cache. Non-positive TTLs disable caching.
	pub fn new(ttl: Duration) -> Self {
		let ttl = if ttl.is_positive() { ttl.unsigned_abs() } else { StdDuration::ZERO };

		Self { ttl, entries: Default::default() }
	}

	/// Configured time-to-live.
	pub fn ttl(&self) -> StdDuration {
		self.ttl
	}

	/// Returns the fresh entry for `fingerprint`, evicting it if it has expired.
	pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
		self.lookup_at(fingerprint, Instant::now())
	}

	/// [`lookup`](Self::lookup) evaluated at an explicit instant.
	pub fn lookup_at(&self, fingerprint: &Fingerprint, now: Instant) -> Option<CacheEntry> {
		let mut entries = self.entries.lock();
		let fresh = entries.get(fingerprint)?.is_fresh_at(self.ttl, now);

		if fresh {
			entries.get(fingerprint).cloned()
		} else {
			entries.remove(fingerprint);

			None
		}
	}

	/// Stores `payload` under `fingerprint`, replacing any previous entry.
	pub fn store(&self, fingerprint: Fingerprint, payload: Value) {
		self.store_at(fingerprint, payload, Instant::now());
	}

	/// [`store`](Self::store) with an explicit capture instant.
	pub fn store_at(&self, fingerprint: Fingerprint, payload: Value, captured_at: Instant) {
		self.entries.lock().insert(fingerprint, CacheEntry { payload, captured_at });
	}

	/// Drops every entry and releases the backing allocation.
	pub fn invalidate_all(&self) {
		let drained = std::mem::take(&mut *self.entries.lock());

		drop(drained);
	}

	/// Number of stored entries, including expired ones not yet evicted.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when no entries are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
