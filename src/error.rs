//! Client-level error types shared across the transport, cache, and recovery layers.
//!
//! Every error is `Clone` so the outcome of a single-flight read can be handed to each
//! caller awaiting it. Sources that are not `Clone` themselves are kept behind an [`Arc`].

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The request could not be built before dispatch.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Transport failure (DNS, TCP, TLS, malformed response body).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Server answered with a 4xx status.
	#[error("Server rejected the request with status {status}.")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Server-supplied `detail` message, when the body carried one.
		detail: Option<String>,
		/// Retry-After hint from the server, if supplied.
		retry_after: Option<Duration>,
	},
	/// Server answered with a 5xx status.
	#[error("Server failed to handle the request with status {status}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Server-supplied `detail` message, when the body carried one.
		detail: Option<String>,
	},
	/// Credentials could not be refreshed; the session has been closed.
	#[error("Session expired: {reason}.")]
	SessionExpired {
		/// Why the refresh attempt failed.
		reason: String,
	},
}
impl Error {
	/// Builds a status error from a non-success response.
	pub fn from_status(status: u16, body: &[u8], retry_after: Option<Duration>) -> Self {
		let detail = extract_detail(body);

		if status >= 500 {
			Self::Server { status, detail }
		} else {
			Self::Client { status, detail, retry_after }
		}
	}

	/// HTTP status carried by the failure, if the server responded.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
			Self::Transport(TransportError::Decode { status, .. }) => *status,
			_ => None,
		}
	}

	/// Server-supplied `detail` message, if any.
	pub fn detail(&self) -> Option<&str> {
		match self {
			Self::Client { detail, .. } | Self::Server { detail, .. } => detail.as_deref(),
			_ => None,
		}
	}

	/// Retry-After hint attached to a 4xx failure.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::Client { retry_after, .. } => *retry_after,
			_ => None,
		}
	}

	/// Returns `true` for the expired-credential signal (401).
	pub fn is_expired_credential(&self) -> bool {
		matches!(self, Self::Client { status: 401, .. })
	}

	/// Returns `true` for the overload signal (429).
	pub fn is_overload(&self) -> bool {
		matches!(self, Self::Client { status: 429, .. })
	}
}

impl From<crate::config::ClientConfigError> for Error {
	fn from(e: crate::config::ClientConfigError) -> Self {
		Self::Config(e.into())
	}
}

/// Configuration failures raised while assembling a client.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// No transport was supplied and the default one is compiled out.
	#[error("No transport is configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
	/// Client configuration failed validation.
	#[error(transparent)]
	Invalid(#[from] crate::config::ClientConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Malformed calls rejected before anything is sent.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RequestError {
	/// Target path was blank.
	#[error("Request path must not be empty.")]
	EmptyPath,
	/// Target path cannot be combined with the base URL.
	#[error("Request path `{path}` does not form a valid URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Query parameters did not serialize into a key-value structure.
	#[error("Query parameters must serialize to a JSON object.")]
	ParamsNotObject,
	/// Query parameters could not be serialized.
	#[error("Query parameters could not be encoded: {message}.")]
	Params {
		/// Serializer message.
		message: String,
	},
	/// Query parameter value is nested too deeply to be encoded.
	#[error("Query parameter `{key}` must be a scalar or a list of scalars.")]
	UnsupportedParam {
		/// Parameter name.
		key: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be encoded: {message}.")]
	Body {
		/// Serializer message.
		message: String,
	},
}
impl RequestError {
	pub(crate) fn body(e: serde_json::Error) -> Self {
		Self::Body { message: e.to_string() }
	}
}

/// Transport-level failures (network, response decoding).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure; no response reached the client.
	#[error("Network error occurred while calling the server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Server returned a body that could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}

	pub(crate) fn decode(
		source: serde_path_to_error::Error<serde_json::Error>,
		status: Option<u16>,
	) -> Self {
		Self::Decode { source: Arc::new(source), status }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn extract_detail(body: &[u8]) -> Option<String> {
	#[derive(Deserialize)]
	struct DetailBody {
		detail: Option<String>,
	}

	serde_json::from_slice::<DetailBody>(body).ok().and_then(|b| b.detail)
}
