//! Single-flight credential refresh coordination.
//!
//! The coordinator is a two-state machine (`Idle`, `Refreshing`). The first call that
//! observes an expired credential while `Idle` becomes the initiator and receives a
//! [`RefreshTicket`]; every call that fails while `Refreshing` queues a one-shot subscriber.
//! Settling the ticket returns the machine to `Idle` and drains the queue in FIFO order
//! with the shared outcome. The queue is swapped out under the state lock, so a
//! subscription either lands in the current drain or starts the next refresh.
//!
//! A ticket dropped before it settles abandons the refresh: the machine returns to `Idle`
//! and every queued channel closes without an outcome, so the waiting calls compete for
//! the next refresh instead of failing.
//!
//! A successful refresh bumps a generation counter. Calls remember the generation their
//! credential was read at; a call that fails with a credential from an older generation
//! replays with the current credential instead of starting another refresh.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use futures::channel::oneshot;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Outcome broadcast to every call waiting on a refresh.
pub(crate) type RefreshOutcome = Result<TokenSecret>;

type Subscriber = Box<dyn FnOnce(RefreshOutcome) + Send>;

#[derive(Default)]
struct RefreshState {
	refreshing: bool,
	generation: u64,
	subscribers: VecDeque<Subscriber>,
}

/// Role assigned to a call that failed with an expired credential.
pub(crate) enum RefreshRole<'a> {
	/// Performs the refresh exchange and settles the ticket.
	Initiator(RefreshTicket<'a>),
	/// Waits for the in-progress refresh to settle.
	Subscriber(oneshot::Receiver<RefreshOutcome>),
	/// Credentials were already replaced after this call read them.
	Superseded,
}

/// Serializes refresh attempts for one client instance.
#[derive(Default)]
pub struct RefreshCoordinator {
	state: Mutex<RefreshState>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Returns `true` while a refresh exchange is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Number of successful refreshes so far.
	pub fn generation(&self) -> u64 {
		self.state.lock().generation
	}

	/// Number of calls queued behind the outstanding refresh.
	pub fn pending_subscribers(&self) -> usize {
		self.state.lock().subscribers.len()
	}

	/// Refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Assigns a role to a call whose credential (read at `observed_generation`) expired.
	pub(crate) fn enter(&self, observed_generation: u64) -> RefreshRole<'_> {
		let mut state = self.state.lock();

		if state.refreshing {
			let (tx, rx) = oneshot::channel();

			state.subscribers.push_back(Box::new(move |outcome| {
				let _ = tx.send(outcome);
			}));
			self.metrics.record_subscription();

			return RefreshRole::Subscriber(rx);
		}
		if observed_generation < state.generation {
			self.metrics.record_replay();

			return RefreshRole::Superseded;
		}

		state.refreshing = true;

		RefreshRole::Initiator(RefreshTicket { coordinator: self, settled: false })
	}

	fn settle(&self, outcome: RefreshOutcome) {
		let subscribers = {
			let mut state = self.state.lock();

			state.refreshing = false;

			if outcome.is_ok() {
				state.generation += 1;
			}

			std::mem::take(&mut state.subscribers)
		};

		for subscriber in subscribers {
			subscriber(outcome.clone());
		}
	}

	fn abandon(&self) {
		let subscribers = {
			let mut state = self.state.lock();

			state.refreshing = false;

			std::mem::take(&mut state.subscribers)
		};

		// Dropping the senders closes every waiting channel.
		drop(subscribers);
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("refreshing", &state.refreshing)
			.field("generation", &state.generation)
			.field("subscribers", &state.subscribers.len())
			.finish()
	}
}

/// Exclusive right to perform the outstanding refresh.
///
/// Dropping an unsettled ticket abandons the refresh and closes every queued channel.
pub(crate) struct RefreshTicket<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl RefreshTicket<'_> {
	/// Returns the coordinator to `Idle` and drains subscribers with `outcome`.
	pub(crate) fn complete(mut self, outcome: RefreshOutcome) {
		self.settled = true;
		self.coordinator.settle(outcome);
	}
}
impl Drop for RefreshTicket<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.abandon();
		}
	}
}
