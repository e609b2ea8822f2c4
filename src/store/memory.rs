//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	store::{CredentialStore, StoreFuture},
};

/// Keeps the credential pair in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<CredentialPair>>>);
impl MemoryStore {
	/// Creates a store seeded with `pair`.
	pub fn with_pair(pair: CredentialPair) -> Self {
		Self(Arc::new(RwLock::new(Some(pair))))
	}

	/// Synchronous snapshot of the stored pair.
	pub fn snapshot(&self) -> Option<CredentialPair> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn fetch(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		let pair = self.snapshot();

		Box::pin(async move { Ok(pair) })
	}

	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		*self.0.write() = Some(pair);

		Box::pin(async { Ok(()) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		self.0.write().take();

		Box::pin(async { Ok(()) })
	}
}
