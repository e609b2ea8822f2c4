// self
use crate::{_prelude::*, config::ClientConfig};

/// Errors raised while constructing or validating client configurations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Base URL must be an HTTP(S) URL.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Refresh endpoint path is required.
	#[error("Refresh endpoint path must not be empty.")]
	EmptyRefreshPath,
	/// Durations must be strictly positive.
	#[error("The {setting} setting must be a positive duration.")]
	NonPositiveDuration {
		/// Which setting failed validation.
		setting: &'static str,
	},
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL that request paths are appended to.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Cache time-to-live.
	pub cache_ttl: Duration,
	/// Fallback rate-limit delay.
	pub default_retry_after: Duration,
	/// Per-request timeout.
	pub request_timeout: Duration,
	/// Optional `User-Agent` header.
	pub user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with defaults and the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.into(),
			cache_ttl: ClientConfig::DEFAULT_CACHE_TTL,
			default_retry_after: ClientConfig::DEFAULT_RETRY_AFTER,
			request_timeout: ClientConfig::DEFAULT_REQUEST_TIMEOUT,
			user_agent: None,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the cache time-to-live.
	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;

		self
	}

	/// Overrides the delay used when a 429 carries no Retry-After hint.
	pub fn default_retry_after(mut self, delay: Duration) -> Self {
		self.default_retry_after = delay;

		self
	}

	/// Overrides the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Sets the `User-Agent` header sent by the default transport.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Validates inputs and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}

		let refresh_path = self.refresh_path.trim().to_owned();

		if refresh_path.is_empty() {
			return Err(ClientConfigError::EmptyRefreshPath);
		}

		for (setting, value) in [
			("cache_ttl", self.cache_ttl),
			("default_retry_after", self.default_retry_after),
			("request_timeout", self.request_timeout),
		] {
			if !value.is_positive() {
				return Err(ClientConfigError::NonPositiveDuration { setting });
			}
		}

		Ok(ClientConfig {
			base_url: self.base_url,
			refresh_path,
			cache_ttl: self.cache_ttl,
			default_retry_after: self.default_retry_after,
			request_timeout: self.request_timeout,
			user_agent: self.user_agent,
		})
	}
}
