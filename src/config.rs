//! Client configuration: base URL, refresh endpoint, cache lifetime, and retry defaults.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::RequestError};

/// Validated settings consumed by [`Client`](crate::client::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL that request paths are appended to.
	pub base_url: Url,
	/// Path of the credential refresh endpoint, relative to the base URL.
	pub refresh_path: String,
	/// Maximum age of a cached read response.
	pub cache_ttl: Duration,
	/// Delay applied to a rate-limited call when the server sends no Retry-After hint.
	pub default_retry_after: Duration,
	/// Per-request timeout applied by the default transport.
	pub request_timeout: Duration,
	/// Optional `User-Agent` header for the default transport.
	pub user_agent: Option<String>,
}
impl ClientConfig {
	/// Default cache time-to-live (300,000 ms).
	pub const DEFAULT_CACHE_TTL: Duration = Duration::milliseconds(300_000);
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/api/v1/auth/token/refresh/";
	/// Default per-request timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);
	/// Default rate-limit delay (60,000 ms).
	pub const DEFAULT_RETRY_AFTER: Duration = Duration::milliseconds(60_000);

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Joins a request path onto the base URL.
	///
	/// Paths are appended to the base URL's own path rather than replacing it, so a base of
	/// `https://api.example.com/v2` and a path of `/items` target `https://api.example.com/v2/items`.
	pub fn resolve(&self, path: &str) -> Result<Url, RequestError> {
		let path = path.trim();

		if path.is_empty() {
			return Err(RequestError::EmptyPath);
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined)
			.map_err(|source| RequestError::InvalidPath { path: path.to_owned(), source })
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, RequestError> {
		self.resolve(&self.refresh_path)
	}
}
