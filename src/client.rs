//! Authenticated REST client facade.
//!
//! [`Client`] owns the transport, credential store, response cache, in-flight registry,
//! and refresh coordinator for one session. Reads go through the cache and the single-flight
//! registry; writes are always dispatched. Every call shares the same recovery loop for
//! expired credentials and rate limits.

pub mod in_flight;
pub mod refresh;
pub mod request;

mod dispatch;

pub use in_flight::InFlightRegistry;
pub use refresh::{RefreshCoordinator, RefreshMetrics};
pub use request::ReadRequest;

// crates.io
use futures::FutureExt;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	cache::ResponseCache,
	config::ClientConfig,
	error::ConfigError,
	ext::{LogoutHandler, NoopLogout, Notifier, TracingNotifier},
	http::Transport,
	obs::{self, CallOutcome, Operation},
	store::{CredentialStore, MemoryStore},
};
use request::Call;

/// Cheaply cloneable handle to one authenticated session.
///
/// Clones share the cache, the in-flight registry, and the refresh coordinator, so
/// de-duplication and refresh serialization hold across every clone.
#[derive(Clone)]
pub struct Client {
	inner: Arc<ClientInner>,
}
impl Client {
	/// Creates a client backed by the default reqwest transport and an in-memory store.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::builder(config).build()
	}

	/// Starts assembling a client with custom collaborators.
	pub fn builder(config: ClientConfig) -> ClientBuilder {
		ClientBuilder::new(config)
	}

	/// Reads `request.path`, serving fresh cached payloads and joining identical reads
	/// already in flight.
	///
	/// Joined callers share the raw payload and each decodes it into its own `T`, so a
	/// shape mismatch is reported once per caller that asked for the mismatched type.
	/// Failures of the shared call itself are reported once.
	pub async fn read<T>(&self, request: ReadRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let payload = self.read_value(request).await?;

		self.inner.decode(payload)
	}

	/// [`read`](Self::read) without decoding the payload.
	pub async fn read_value(&self, request: ReadRequest) -> Result<Value> {
		let inner = &self.inner;
		let fingerprint = request.fingerprint();

		let cached = if request.use_cache { inner.cache.lookup(&fingerprint) } else { None };

		if let Some(entry) = cached {
			obs::record_call_outcome(Operation::Read, CallOutcome::CacheHit);

			return Ok(entry.payload);
		}

		let call = Call::read(&inner.config, &request).map_err(|e| inner.report(e.into()))?;
		let (shared, _) = inner.in_flight.join_or_start(&fingerprint, |ticket| {
			let inner = Arc::clone(&self.inner);
			let fingerprint = fingerprint.clone();

			async move {
				let outcome = inner.execute(&call).await;

				inner.in_flight.settle(&fingerprint, ticket, || {
					if let Ok(payload) = &outcome {
						inner.cache.store(fingerprint.clone(), payload.clone());
					}
				});

				outcome
			}
			.boxed()
		});

		shared.await
	}

	/// Sends a create (`POST`) with a JSON body.
	pub async fn create<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.write(Operation::Create, path, Some(body)).await
	}

	/// Sends a full replacement (`PUT`) with a JSON body.
	pub async fn replace<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.write(Operation::Replace, path, Some(body)).await
	}

	/// Sends a partial update (`PATCH`) with a JSON body.
	pub async fn modify<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.write(Operation::Modify, path, Some(body)).await
	}

	/// Sends a removal (`DELETE`). Empty responses decode from JSON `null`, so `()` and
	/// `Option<_>` both work as `T`.
	pub async fn remove<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.write::<T, ()>(Operation::Remove, path, None).await
	}

	/// Drops every cached response.
	pub fn clear_cache(&self) {
		self.inner.cache.invalidate_all();
	}

	/// Forgets every in-flight read and returns how many were registered.
	///
	/// Dispatched calls still settle for the callers already awaiting them, but later reads
	/// start fresh calls and the abandoned results are not cached.
	pub fn cancel_all(&self) -> usize {
		self.inner.in_flight.clear()
	}

	/// Ends the session: clears the cache, in-flight reads, and stored credentials, then
	/// signals the logout handler.
	pub async fn logout(&self) -> Result<()> {
		self.inner.end_session().await
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Response cache shared by every clone.
	pub fn cache(&self) -> &ResponseCache {
		&self.inner.cache
	}

	/// In-flight read registry shared by every clone.
	pub fn in_flight(&self) -> &InFlightRegistry {
		&self.inner.in_flight
	}

	/// Refresh state machine shared by every clone.
	pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
		&self.inner.refresh
	}

	/// Refresh exchange counters.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.inner.refresh.metrics()
	}

	async fn write<T, B>(&self, op: Operation, path: &str, body: Option<&B>) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let inner = &self.inner;
		let call = Call::write(&inner.config, op, path, body).map_err(|e| inner.report(e.into()))?;
		let payload = inner.execute(&call).await?;

		inner.decode(payload)
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.inner.config)
			.field("cached_entries", &self.inner.cache.len())
			.field("in_flight", &self.inner.in_flight)
			.field("refresh", &self.inner.refresh)
			.finish()
	}
}

/// Assembles a [`Client`] from a configuration and optional collaborators.
///
/// Unset collaborators default to an in-memory credential store, a logout handler that
/// does nothing, a notifier that logs through `tracing`, and (with the `reqwest` feature)
/// a reqwest transport built from the configuration.
pub struct ClientBuilder {
	config: ClientConfig,
	transport: Option<Arc<dyn Transport>>,
	store: Arc<dyn CredentialStore>,
	logout: Arc<dyn LogoutHandler>,
	notifier: Arc<dyn Notifier>,
}
impl ClientBuilder {
	/// Creates a builder with default collaborators.
	pub fn new(config: ClientConfig) -> Self {
		Self {
			config,
			transport: None,
			store: Arc::new(MemoryStore::default()),
			logout: Arc::new(NoopLogout),
			notifier: Arc::new(TracingNotifier),
		}
	}

	/// Uses a caller-provided transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Uses a caller-provided credential store.
	pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Uses a caller-provided logout handler.
	pub fn logout_handler(mut self, logout: Arc<dyn LogoutHandler>) -> Self {
		self.logout = logout;

		self
	}

	/// Uses a caller-provided notifier.
	pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
		self.notifier = notifier;

		self
	}

	/// Finalizes the client.
	pub fn build(self) -> Result<Client> {
		let transport = match self.transport {
			Some(transport) => transport,
			None => default_transport(&self.config)?,
		};
		let inner = ClientInner {
			cache: ResponseCache::new(self.config.cache_ttl),
			in_flight: InFlightRegistry::default(),
			refresh: RefreshCoordinator::default(),
			config: self.config,
			transport,
			store: self.store,
			logout: self.logout,
			notifier: self.notifier,
		};

		Ok(Client { inner: Arc::new(inner) })
	}
}
impl Debug for ClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("config", &self.config)
			.field("transport_set", &self.transport.is_some())
			.finish()
	}
}

pub(crate) struct ClientInner {
	pub(crate) config: ClientConfig,
	pub(crate) transport: Arc<dyn Transport>,
	pub(crate) store: Arc<dyn CredentialStore>,
	pub(crate) logout: Arc<dyn LogoutHandler>,
	pub(crate) notifier: Arc<dyn Notifier>,
	pub(crate) cache: ResponseCache,
	pub(crate) in_flight: InFlightRegistry,
	pub(crate) refresh: RefreshCoordinator,
}

#[cfg(feature = "reqwest")]
fn default_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>, ConfigError> {
	Ok(Arc::new(ReqwestTransport::from_config(config)?))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport(_: &ClientConfig) -> Result<Arc<dyn Transport>, ConfigError> {
	Err(ConfigError::MissingTransport)
}
