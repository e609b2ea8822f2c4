//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
// self
use rest_broker::{
	auth::CredentialPair,
	client::Client,
	config::ClientConfig,
	error::Result,
	ext::{LogoutHandler, Notifier},
	http::{ApiRequest, ApiResponse, Transport, TransportFuture},
	notice::{FailureKind, Notice},
	store::MemoryStore,
	url::Url,
};

pub const STALE_ACCESS: &str = "access-stale";
pub const FRESH_ACCESS: &str = "access-fresh";
pub const REFRESH: &str = "refresh-1";

/// Notifier that keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);
impl RecordingNotifier {
	pub fn notices(&self) -> Vec<Notice> {
		self.0.lock().clone()
	}

	pub fn kinds(&self) -> Vec<FailureKind> {
		self.0.lock().iter().map(|notice| notice.kind).collect()
	}

	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl Notifier for RecordingNotifier {
	fn notify(&self, notice: &Notice) {
		self.0.lock().push(notice.clone());
	}
}

/// Logout handler that counts how often the session ended.
#[derive(Debug, Default)]
pub struct CountingLogout(AtomicUsize);
impl CountingLogout {
	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}
impl LogoutHandler for CountingLogout {
	fn on_logout(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// In-process transport answering from a handler and logging every request.
pub struct ScriptedTransport {
	handler: Handler,
	requests: Mutex<Vec<ApiRequest>>,
}
impl ScriptedTransport {
	pub fn new<F>(handler: F) -> Arc<Self>
	where
		F: 'static + Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync,
	{
		Arc::new(Self { handler: Box::new(handler), requests: Default::default() })
	}

	/// Answers with `responses` in order, one per request.
	pub fn sequence(responses: Vec<Result<ApiResponse>>) -> Arc<Self> {
		let queue = Mutex::new(VecDeque::from(responses));

		Self::new(move |_| {
			queue.lock().pop_front().expect("Scripted transport should have a response left.")
		})
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		let response = (self.handler)(&request);

		self.requests.lock().push(request);

		Box::pin(async move {
			// Stay pending for one poll so concurrent callers observe the call in flight.
			tokio::task::yield_now().await;

			response
		})
	}
}

/// Client plus handles on every collaborator it was built with.
pub struct Harness {
	pub client: Client,
	pub store: MemoryStore,
	pub notifier: Arc<RecordingNotifier>,
	pub logout: Arc<CountingLogout>,
}

pub fn config(base: &str) -> ClientConfig {
	ClientConfig::builder(Url::parse(base).expect("Base URL fixture should parse."))
		.build()
		.expect("Default configuration should validate.")
}

pub fn stale_pair() -> CredentialPair {
	CredentialPair::new(STALE_ACCESS).with_refresh(REFRESH)
}

pub fn harness(config: ClientConfig, transport: Option<Arc<dyn Transport>>) -> Harness {
	harness_with_pair(config, transport, Some(stale_pair()))
}

pub fn harness_with_pair(
	config: ClientConfig,
	transport: Option<Arc<dyn Transport>>,
	pair: Option<CredentialPair>,
) -> Harness {
	let store = pair.map(MemoryStore::with_pair).unwrap_or_default();
	let notifier = Arc::new(RecordingNotifier::default());
	let logout = Arc::new(CountingLogout::default());
	let mut builder = Client::builder(config)
		.store(Arc::new(store.clone()))
		.notifier(notifier.clone())
		.logout_handler(logout.clone());

	if let Some(transport) = transport {
		builder = builder.transport(transport);
	}

	let client = builder.build().expect("Client should build.");

	Harness { client, store, notifier, logout }
}
