//! Transport primitives for REST calls.
//!
//! The module exposes the [`Transport`] trait alongside crate-owned [`ApiRequest`] and
//! [`ApiResponse`] types so downstream crates can plug in any HTTP stack without the
//! client depending on its request or response structures. The transport only moves
//! bytes: status classification, retries, and credential recovery stay in the client.

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, error::ConfigError};
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single REST call.
///
/// Implementations must return `Ok` for every response the server produced, whatever its
/// status, and reserve `Err` for calls that never produced a response (network failures)
/// or could not be sent at all. Implementations must be `Send + Sync + 'static` so one
/// transport can be shared by every in-flight call of a client.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends the request and resolves with the raw response.
	fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// Read.
	Get,
	/// Create.
	Post,
	/// Replace.
	Put,
	/// Partial update.
	Patch,
	/// Remove.
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Fully resolved call handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Bearer credential for the `Authorization` header, when one is available.
	pub bearer: Option<TokenSecret>,
	/// JSON-encoded body, if the verb carries one.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without credentials or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, bearer: None, body: None }
	}

	/// Attaches a bearer credential.
	pub fn with_bearer(mut self, bearer: Option<TokenSecret>) -> Self {
		self.bearer = bearer;

		self
	}

	/// Attaches a JSON-encoded body.
	pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}
}

/// Raw server response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, retry_after: None, body: body.into() }
	}

	/// Sets the Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.retry_after = Some(retry_after);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes a successful body into JSON or converts a failure status into an [`Error`].
	///
	/// Empty bodies (e.g. `204 No Content`) decode as JSON `null`.
	pub fn into_payload(self) -> Result<Value> {
		if !self.is_success() {
			return Err(Error::from_status(self.status, &self.body, self.retry_after));
		}
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|e| TransportError::decode(e, Some(self.status)).into())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a reqwest client honoring the configured timeout and user agent.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().timeout(config.request_timeout.unsigned_abs());

		if let Some(agent) = &config.user_agent {
			builder = builder.user_agent(agent.as_str());
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = self
				.0
				.request(request.method.into(), request.url)
				.header(ACCEPT, "application/json")
				.header("X-Requested-With", "XMLHttpRequest");

			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}
			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		// A date already passed means retry now.
		return Some((moment - OffsetDateTime::now_utc()).max(Duration::ZERO));
	}

	None
}
