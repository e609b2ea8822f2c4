mod common;

// crates.io
use serde::Deserialize;
use serde_json::json;
// self
use common::*;
use rest_broker::{
	client::ReadRequest,
	error::{Error, RequestError, TransportError},
	http::ApiResponse,
	notice::FailureKind,
};

const BASE: &str = "https://api.example.com";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Alert {
	id: u64,
}

#[tokio::test]
async fn terminal_statuses_are_classified_and_reported_once() {
	let cases = [
		(400, FailureKind::BadRequest),
		(403, FailureKind::Forbidden),
		(404, FailureKind::NotFound),
		(409, FailureKind::UnclassifiedClientStatus),
		(500, FailureKind::ServerError),
		(502, FailureKind::ServerError),
	];

	for (status, kind) in cases {
		let transport = ScriptedTransport::sequence(vec![Ok(ApiResponse::new(status, "{}"))]);
		let harness = harness(config(BASE), Some(transport.clone()));
		let err = harness
			.client
			.read_value(ReadRequest::new("/api/v1/alerts/"))
			.await
			.expect_err("Terminal status should fail the read.");

		assert_eq!(err.status(), Some(status));
		assert_eq!(harness.notifier.kinds(), vec![kind], "{status}");
		assert_eq!(transport.request_count(), 1, "{status}");
	}
}

#[tokio::test]
async fn bad_request_detail_is_shown_verbatim() {
	let transport = ScriptedTransport::sequence(vec![Ok(ApiResponse::new(
		400,
		r#"{"detail":"Title may not be blank."}"#,
	))]);
	let harness = harness(config(BASE), Some(transport));
	let err = harness
		.client
		.create::<serde_json::Value, _>("/api/v1/alerts/", &json!({ "title": "" }))
		.await
		.expect_err("Validation failure should surface.");

	assert_eq!(err.detail(), Some("Title may not be blank."));
	assert_eq!(harness.notifier.notices()[0].message, "Title may not be blank.");
}

#[tokio::test]
async fn joined_reads_share_one_failure_notice() {
	let transport = ScriptedTransport::sequence(vec![Ok(ApiResponse::new(503, ""))]);
	let harness = harness(config(BASE), Some(transport.clone()));
	let client = &harness.client;
	let (first, second, third) = tokio::join!(
		client.read_value(ReadRequest::new("/api/v1/summary/")),
		client.read_value(ReadRequest::new("/api/v1/summary/")),
		client.read_value(ReadRequest::new("/api/v1/summary/")),
	);

	for outcome in [first, second, third] {
		assert!(matches!(outcome, Err(Error::Server { status: 503, .. })));
	}

	assert_eq!(transport.request_count(), 1);
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::ServerError]);
	assert!(client.cache().is_empty());
	assert!(client.in_flight().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
	let transport = ScriptedTransport::new(|_| {
		Err(TransportError::network(std::io::Error::new(
			std::io::ErrorKind::ConnectionRefused,
			"connection refused",
		))
		.into())
	});
	let harness = harness(config(BASE), Some(transport.clone()));
	let err = harness
		.client
		.remove::<()>("/api/v1/alerts/3/")
		.await
		.expect_err("Network failure should surface.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(err.status(), None);
	assert_eq!(transport.request_count(), 1);
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::NetworkUnreachable]);
	assert_eq!(harness.logout.count(), 0);
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn default_transport_reports_refused_connections() {
	let harness = harness(config("http://127.0.0.1:1"), None);
	let err = harness
		.client
		.read_value(ReadRequest::new("/api/v1/summary/"))
		.await
		.expect_err("Nothing listens on port 1.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::NetworkUnreachable]);
}

#[tokio::test]
async fn malformed_calls_fail_before_dispatch() {
	let transport = ScriptedTransport::sequence(Vec::new());
	let harness = harness(config(BASE), Some(transport.clone()));
	let err = harness
		.client
		.read_value(ReadRequest::new("   "))
		.await
		.expect_err("Blank paths cannot be dispatched.");

	assert!(matches!(err, Error::Request(RequestError::EmptyPath)));

	let err = harness
		.client
		.read_value(ReadRequest::new("/api/v1/alerts/").param("filter", json!({ "nested": true })))
		.await
		.expect_err("Nested parameters cannot be encoded.");

	assert!(matches!(err, Error::Request(RequestError::UnsupportedParam { .. })));
	assert_eq!(transport.request_count(), 0);
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::RequestConstructionError; 2]);
}

#[tokio::test]
async fn unexpected_payload_shape_is_reported() {
	let transport =
		ScriptedTransport::sequence(vec![Ok(ApiResponse::new(200, r#"{"id":"forty-two"}"#))]);
	let harness = harness(config(BASE), Some(transport));
	let err = harness
		.client
		.read::<Alert>(ReadRequest::new("/api/v1/alerts/42/"))
		.await
		.expect_err("A string id cannot decode into an integer.");

	let Error::Transport(TransportError::Decode { source, .. }) = &err else {
		panic!("Expected a decode error, got {err:?}.");
	};

	assert_eq!(source.path().to_string(), "id");
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::RequestConstructionError]);
	// The raw payload was valid JSON, so the cache still holds it.
	assert_eq!(harness.client.cache().len(), 1);
}

#[tokio::test]
async fn joined_reads_decode_independently() {
	let transport =
		ScriptedTransport::sequence(vec![Ok(ApiResponse::new(200, r#"{"id":"forty-two"}"#))]);
	let harness = harness(config(BASE), Some(transport.clone()));
	let client = &harness.client;
	let (typed, raw, other) = tokio::join!(
		client.read::<Alert>(ReadRequest::new("/api/v1/alerts/42/")),
		client.read::<serde_json::Value>(ReadRequest::new("/api/v1/alerts/42/")),
		client.read::<Alert>(ReadRequest::new("/api/v1/alerts/42/")),
	);

	assert!(typed.is_err());
	assert_eq!(raw.expect("Untyped read should accept any payload."), json!({ "id": "forty-two" }));
	assert!(other.is_err());
	assert_eq!(transport.request_count(), 1);
	assert_eq!(harness.notifier.kinds(), vec![FailureKind::RequestConstructionError; 2]);
}
