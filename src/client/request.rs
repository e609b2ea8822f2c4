//! Request descriptions and their resolution into transport calls.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::Fingerprint,
	config::ClientConfig,
	error::RequestError,
	http::ApiRequest,
	obs::Operation,
};

/// Parameters for a cached, de-duplicated read.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadRequest {
	/// Target path, relative to the configured base URL.
	pub path: String,
	/// Query parameters; `null` values are dropped.
	pub params: BTreeMap<String, Value>,
	/// Serves fresh cached responses when true.
	pub use_cache: bool,
}
impl ReadRequest {
	/// Creates a cache-enabled read for `path` without parameters.
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into(), params: BTreeMap::new(), use_cache: true }
	}

	/// Sets a single query parameter. Setting `null` removes the parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		let key = key.into();
		let value = value.into();

		if value.is_null() {
			self.params.remove(&key);
		} else {
			self.params.insert(key, value);
		}

		self
	}

	/// Merges every field of a serializable parameter struct or map.
	pub fn with_params<P>(mut self, params: &P) -> Result<Self, RequestError>
	where
		P: ?Sized + Serialize,
	{
		let value = serde_json::to_value(params)
			.map_err(|e| RequestError::Params { message: e.to_string() })?;

		match value {
			Value::Null => Ok(self),
			Value::Object(map) => {
				for (key, value) in map {
					self = self.param(key, value);
				}

				Ok(self)
			},
			_ => Err(RequestError::ParamsNotObject),
		}
	}

	/// Skips the cache lookup; the response is still cached once it arrives.
	pub fn bypass_cache(self) -> Self {
		self.with_cache(false)
	}

	/// Overrides the cache flag.
	pub fn with_cache(mut self, use_cache: bool) -> Self {
		self.use_cache = use_cache;

		self
	}

	/// Cache and de-duplication key for this read.
	pub fn fingerprint(&self) -> Fingerprint {
		Fingerprint::new(&self.path, &self.params)
	}
}

/// Fully resolved call that can be replayed with a different credential.
#[derive(Clone, Debug)]
pub(crate) struct Call {
	pub(crate) op: Operation,
	pub(crate) url: Url,
	pub(crate) body: Option<Vec<u8>>,
}
impl Call {
	pub(crate) fn read(config: &ClientConfig, request: &ReadRequest) -> Result<Self, RequestError> {
		let mut url = config.resolve(&request.path)?;

		encode_query(&mut url, &request.params)?;

		Ok(Self { op: Operation::Read, url, body: None })
	}

	pub(crate) fn write<B>(
		config: &ClientConfig,
		op: Operation,
		path: &str,
		body: Option<&B>,
	) -> Result<Self, RequestError>
	where
		B: ?Sized + Serialize,
	{
		let url = config.resolve(path)?;
		let body = body.map(serde_json::to_vec).transpose().map_err(RequestError::body)?;

		Ok(Self { op, url, body })
	}

	pub(crate) fn to_request(&self, bearer: Option<TokenSecret>) -> ApiRequest {
		ApiRequest {
			method: self.op.method(),
			url: self.url.clone(),
			bearer,
			body: self.body.clone(),
		}
	}
}

fn encode_query(url: &mut Url, params: &BTreeMap<String, Value>) -> Result<(), RequestError> {
	let mut encoded = Vec::new();

	for (key, value) in params {
		match value {
			Value::Array(items) =>
				for item in items {
					if let Some(item) = scalar(key, item)? {
						encoded.push((key.as_str(), item));
					}
				},
			other =>
				if let Some(item) = scalar(key, other)? {
					encoded.push((key.as_str(), item));
				},
		}
	}

	if !encoded.is_empty() {
		url.query_pairs_mut().extend_pairs(encoded);
	}

	Ok(())
}

fn scalar(key: &str, value: &Value) -> Result<Option<String>, RequestError> {
	match value {
		Value::Null => Ok(None),
		Value::Bool(b) => Ok(Some(b.to_string())),
		Value::Number(n) => Ok(Some(n.to_string())),
		Value::String(s) => Ok(Some(s.clone())),
		Value::Array(_) | Value::Object(_) =>
			Err(RequestError::UnsupportedParam { key: key.to_owned() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::Method;

	#[derive(Serialize)]
	struct AlertFilter {
		page: u32,
		severity: Option<&'static str>,
		status: &'static str,
	}

	fn config() -> ClientConfig {
		ClientConfig::builder(Url::parse("https://api.example.com").expect("URL should parse."))
			.build()
			.expect("Configuration should validate.")
	}

	#[test]
	fn params_struct_and_builder_share_a_fingerprint() {
		let from_struct = ReadRequest::new("/api/v1/alerts/")
			.with_params(&AlertFilter { page: 2, severity: None, status: "open" })
			.expect("Parameter struct should serialize.");
		let from_builder =
			ReadRequest::new("/api/v1/alerts/").param("status", "open").param("page", 2);

		assert_eq!(from_struct.fingerprint(), from_builder.fingerprint());
		assert!(!from_struct.params.contains_key("severity"));
	}

	#[test]
	fn read_call_encodes_query_in_key_order() {
		let request = ReadRequest::new("/api/v1/alerts/")
			.param("status", "open")
			.param("ids", serde_json::json!([3, 5]))
			.param("page", 1);
		let call = Call::read(&config(), &request).expect("Read call should resolve.");

		assert_eq!(call.op.method(), Method::Get);
		assert_eq!(
			call.url.as_str(),
			"https://api.example.com/api/v1/alerts/?ids=3&ids=5&page=1&status=open"
		);
	}

	#[test]
	fn nested_params_and_scalar_param_sets_are_rejected() {
		let request = ReadRequest::new("/x").param("filter", serde_json::json!({ "a": 1 }));

		assert_eq!(
			Call::read(&config(), &request).expect_err("Nested objects cannot be encoded."),
			RequestError::UnsupportedParam { key: "filter".into() }
		);
		assert_eq!(
			ReadRequest::new("/x").with_params(&5).expect_err("Scalars are not parameter sets."),
			RequestError::ParamsNotObject
		);
	}

	#[test]
	fn write_call_serializes_body() {
		let call = Call::write(
			&config(),
			Operation::Modify,
			"/api/v1/alerts/9/",
			Some(&serde_json::json!({ "status": "closed" })),
		)
		.expect("Write call should resolve.");
		let request = call.to_request(Some(TokenSecret::new("t")));

		assert_eq!(request.method, Method::Patch);
		assert_eq!(request.body.as_deref(), Some(br#"{"status":"closed"}"#.as_slice()));
		assert_eq!(request.bearer.as_ref().map(TokenSecret::expose), Some("t"));
	}
}
