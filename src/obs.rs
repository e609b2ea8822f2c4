//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `rest_broker.call` with the `op` (verb or
//!   refresh) and `stage` (call site) fields, plus debug events for every recovery decision.
//! - Enable `metrics` to increment the `rest_broker_call_total` counter for every
//!   attempt/success/failure/cache hit, labeled by `op` + `outcome`, and the
//!   `rest_broker_recovery_total` counter labeled by `op` + `action`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, http::Method};

/// Logical operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Cached, de-duplicated read.
	Read,
	/// Create.
	Create,
	/// Full replacement.
	Replace,
	/// Partial update.
	Modify,
	/// Removal.
	Remove,
	/// Credential refresh exchange.
	Refresh,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Read => "read",
			Operation::Create => "create",
			Operation::Replace => "replace",
			Operation::Modify => "modify",
			Operation::Remove => "remove",
			Operation::Refresh => "refresh",
		}
	}

	/// HTTP verb used by the operation.
	pub const fn method(self) -> Method {
		match self {
			Operation::Read => Method::Get,
			Operation::Create | Operation::Refresh => Method::Post,
			Operation::Replace => Method::Put,
			Operation::Modify => Method::Patch,
			Operation::Remove => Method::Delete,
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Read answered from the response cache.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::CacheHit => "cache_hit",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Local recovery decisions taken for a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecoveryAction {
	/// The call started a credential refresh.
	Refresh,
	/// The call queued behind a refresh already in progress.
	Subscribe,
	/// The call was sent with a credential that had already been replaced and is replayed.
	Replay,
	/// The call waits out a rate limit before its retry.
	Backoff,
}
impl RecoveryAction {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RecoveryAction::Refresh => "refresh",
			RecoveryAction::Subscribe => "subscribe",
			RecoveryAction::Replay => "replay",
			RecoveryAction::Backoff => "backoff",
		}
	}
}
