//! Single-flight registry for reads.
//!
//! Each fingerprint maps to at most one shared call. Registrations carry a ticket so a
//! call that settles after [`InFlightRegistry::clear`] never removes a newer registration
//! for the same fingerprint.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{_prelude::*, cache::Fingerprint};

/// Shared handle every caller of one read awaits.
pub(crate) type SharedCall = Shared<BoxFuture<'static, Result<Value>>>;

/// Fingerprint-keyed table of in-progress reads.
#[derive(Default)]
pub struct InFlightRegistry {
	next_ticket: AtomicU64,
	calls: Mutex<HashMap<Fingerprint, (u64, SharedCall)>>,
}
impl InFlightRegistry {
	/// Returns the call registered for `fingerprint`, or registers the one built by `start`.
	///
	/// `start` receives the ticket the new call must hand back to [`settle`](Self::settle).
	/// The boolean is `true` when a new call was registered.
	pub(crate) fn join_or_start<F>(&self, fingerprint: &Fingerprint, start: F) -> (SharedCall, bool)
	where
		F: FnOnce(u64) -> BoxFuture<'static, Result<Value>>,
	{
		let mut calls = self.calls.lock();

		if let Some((_, call)) = calls.get(fingerprint) {
			return (call.clone(), false);
		}

		let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
		let call = start(ticket).shared();

		calls.insert(fingerprint.clone(), (ticket, call.clone()));

		(call, true)
	}

	/// Removes the registration for `fingerprint` if it still belongs to `ticket`.
	///
	/// `on_owned` runs before the removal and only for the owning ticket, while the registry
	/// is locked, so no joiner can slip in between the two steps.
	pub(crate) fn settle<F>(&self, fingerprint: &Fingerprint, ticket: u64, on_owned: F) -> bool
	where
		F: FnOnce(),
	{
		let mut calls = self.calls.lock();

		if calls.get(fingerprint).is_some_and(|(owner, _)| *owner == ticket) {
			on_owned();
			calls.remove(fingerprint);

			true
		} else {
			false
		}
	}

	/// Forgets every registration. Dispatched calls keep running for their current awaiters.
	pub fn clear(&self) -> usize {
		let drained = std::mem::take(&mut *self.calls.lock());

		drained.len()
	}

	/// Number of registered calls.
	pub fn len(&self) -> usize {
		self.calls.lock().len()
	}

	/// Returns `true` when no call is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl Debug for InFlightRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InFlightRegistry").field("calls", &self.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::AtomicUsize;
	// self
	use super::*;

	fn key(path: &str) -> Fingerprint {
		Fingerprint::new(path, &BTreeMap::new())
	}

	#[tokio::test]
	async fn concurrent_joiners_share_one_call() {
		let registry = Arc::new(InFlightRegistry::default());
		let starts = Arc::new(AtomicUsize::new(0));
		let fingerprint = key("/items/42");
		let mut calls = Vec::new();

		for _ in 0..3 {
			let registry_in_call = Arc::clone(&registry);
			let starts = Arc::clone(&starts);
			let fingerprint_in_call = fingerprint.clone();
			let (call, _) = registry.join_or_start(&fingerprint, move |ticket| {
				starts.fetch_add(1, Ordering::SeqCst);

				async move {
					tokio::task::yield_now().await;
					registry_in_call.settle(&fingerprint_in_call, ticket, || {});

					Ok(serde_json::json!({ "id": 42 }))
				}
				.boxed()
			});

			calls.push(call);
		}

		let results = futures::future::join_all(calls).await;

		assert_eq!(starts.load(Ordering::SeqCst), 1);
		assert!(results.iter().all(|r| r.as_ref().ok() == Some(&serde_json::json!({ "id": 42 }))));
		assert!(registry.is_empty());
	}

	#[test]
	fn stale_ticket_never_removes_a_newer_registration() {
		let registry = InFlightRegistry::default();
		let fingerprint = key("/items/7");
		let (_, first) =
			registry.join_or_start(&fingerprint, |_| async { Ok(Value::Null) }.boxed());

		assert!(first);
		assert_eq!(registry.clear(), 1);

		let (_, second) =
			registry.join_or_start(&fingerprint, |_| async { Ok(Value::Null) }.boxed());

		assert!(second);
		let mut ran = false;

		assert!(!registry.settle(&fingerprint, 0, || ran = true));
		assert!(!ran);
		assert_eq!(registry.len(), 1);
		assert!(registry.settle(&fingerprint, 1, || ran = true));
		assert!(ran);
		assert!(registry.is_empty());
	}
}
