//! Failure classification and the user-facing notices derived from it.

// self
use crate::{_prelude::*, error::TransportError};

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Closed taxonomy of terminal failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
	/// 400.
	BadRequest,
	/// 401, or a session that could not be refreshed.
	Unauthorized,
	/// 403.
	Forbidden,
	/// 404.
	NotFound,
	/// 429 that survived its single retry.
	RateLimited,
	/// Any 5xx.
	ServerError,
	/// Any other status the server answered with.
	UnclassifiedClientStatus,
	/// No response reached the client.
	NetworkUnreachable,
	/// The call failed before dispatch or its response could not be processed.
	RequestConstructionError,
}
impl FailureKind {
	/// Classifies a client error.
	pub fn of(error: &Error) -> Self {
		match error {
			Error::Client { status, .. } | Error::Server { status, .. } => Self::from_status(*status),
			Error::SessionExpired { .. } => Self::Unauthorized,
			Error::Transport(TransportError::Network { .. }) => Self::NetworkUnreachable,
			Error::Transport(TransportError::Decode { .. })
			| Error::Request(_)
			| Error::Config(_)
			| Error::Storage(_) => Self::RequestConstructionError,
		}
	}

	/// Classifies a raw HTTP status.
	pub fn from_status(status: u16) -> Self {
		match status {
			400 => Self::BadRequest,
			401 => Self::Unauthorized,
			403 => Self::Forbidden,
			404 => Self::NotFound,
			429 => Self::RateLimited,
			500..=599 => Self::ServerError,
			_ => Self::UnclassifiedClientStatus,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::BadRequest => "bad_request",
			Self::Unauthorized => "unauthorized",
			Self::Forbidden => "forbidden",
			Self::NotFound => "not_found",
			Self::RateLimited => "rate_limited",
			Self::ServerError => "server_error",
			Self::UnclassifiedClientStatus => "unclassified_client_status",
			Self::NetworkUnreachable => "network_unreachable",
			Self::RequestConstructionError => "request_construction_error",
		}
	}

	/// Default human-readable message for the kind.
	pub const fn message(self) -> &'static str {
		match self {
			Self::BadRequest => "The request was invalid.",
			Self::Unauthorized => "You are not authorized to perform this request.",
			Self::Forbidden => "You do not have permission to perform this action.",
			Self::NotFound => "The requested resource was not found.",
			Self::RateLimited => "Too many requests. Please try again later.",
			Self::ServerError => "The server encountered an internal error.",
			Self::UnclassifiedClientStatus => "An unexpected error occurred.",
			Self::NetworkUnreachable => "Unable to reach the server.",
			Self::RequestConstructionError => "The request could not be processed.",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	/// Failure category.
	pub kind: FailureKind,
	/// HTTP status, when the server responded.
	pub status: Option<u16>,
	/// Text to present.
	pub message: String,
}
impl Notice {
	/// Builds the notice for a terminal failure.
	///
	/// Bad requests show the server's `detail` when present. A `detail` reporting that no
	/// active account matched is shown with the session message; this only changes the text,
	/// never the retry behavior.
	pub fn from_error(error: &Error) -> Self {
		let kind = FailureKind::of(error);
		let detail = error.detail().filter(|d| !d.trim().is_empty());
		let message = match (kind, detail) {
			(_, Some(d)) if d.starts_with("No active account") => SESSION_EXPIRED_MESSAGE.into(),
			(FailureKind::BadRequest, Some(d)) => d.to_owned(),
			(_, _) if matches!(error, Error::SessionExpired { .. }) => SESSION_EXPIRED_MESSAGE.into(),
			_ => kind.message().into(),
		};

		Self { kind, status: error.status(), message }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::RequestError;

	#[test]
	fn statuses_map_onto_the_taxonomy() {
		let cases = [
			(400, FailureKind::BadRequest),
			(401, FailureKind::Unauthorized),
			(403, FailureKind::Forbidden),
			(404, FailureKind::NotFound),
			(409, FailureKind::UnclassifiedClientStatus),
			(429, FailureKind::RateLimited),
			(500, FailureKind::ServerError),
			(503, FailureKind::ServerError),
		];

		for (status, kind) in cases {
			assert_eq!(FailureKind::of(&Error::from_status(status, b"", None)), kind, "{status}");
		}
	}

	#[test]
	fn non_status_failures_are_classified() {
		let network: Error = TransportError::network(std::io::Error::other("reset")).into();

		assert_eq!(FailureKind::of(&network), FailureKind::NetworkUnreachable);
		assert_eq!(
			FailureKind::of(&RequestError::EmptyPath.into()),
			FailureKind::RequestConstructionError
		);
		assert_eq!(
			FailureKind::of(&Error::SessionExpired { reason: "refresh rejected".into() }),
			FailureKind::Unauthorized
		);
	}

	#[test]
	fn bad_request_prefers_server_detail() {
		let notice = Notice::from_error(&Error::from_status(
			400,
			br#"{"detail":"Severity must be one of low, high."}"#,
			None,
		));

		assert_eq!(notice.kind, FailureKind::BadRequest);
		assert_eq!(notice.status, Some(400));
		assert_eq!(notice.message, "Severity must be one of low, high.");

		let notice = Notice::from_error(&Error::from_status(400, b"", None));

		assert_eq!(notice.message, FailureKind::BadRequest.message());
	}

	#[test]
	fn missing_account_detail_only_changes_the_message() {
		let error = Error::from_status(
			401,
			br#"{"detail":"No active account found with the given credentials"}"#,
			None,
		);
		let notice = Notice::from_error(&error);

		assert_eq!(notice.kind, FailureKind::Unauthorized);
		assert_eq!(notice.message, SESSION_EXPIRED_MESSAGE);
	}
}
