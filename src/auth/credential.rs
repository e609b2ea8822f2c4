//! Access/refresh credential pair owned by the credential store.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Current access credential plus the refresh credential used to renew it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Bearer credential attached to outgoing calls.
	pub access: TokenSecret,
	/// Credential exchanged at the refresh endpoint, if one was issued.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh: Option<TokenSecret>,
}
impl CredentialPair {
	/// Creates a pair holding only an access credential.
	pub fn new(access: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: None }
	}

	/// Attaches a refresh credential.
	pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
		self.refresh = Some(TokenSecret::new(refresh));

		self
	}

	/// Produces the pair stored after a successful refresh.
	///
	/// The previous refresh credential is kept when the server did not rotate it.
	pub fn rotate(&self, access: TokenSecret, refresh: Option<TokenSecret>) -> Self {
		Self { access, refresh: refresh.or_else(|| self.refresh.clone()) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rotation_keeps_refresh_credential_when_not_reissued() {
		let pair = CredentialPair::new("access-1").with_refresh("refresh-1");
		let rotated = pair.rotate(TokenSecret::new("access-2"), None);

		assert_eq!(rotated.access.expose(), "access-2");
		assert_eq!(rotated.refresh.as_ref().map(TokenSecret::expose), Some("refresh-1"));

		let rotated = pair.rotate(TokenSecret::new("access-3"), Some(TokenSecret::new("refresh-2")));

		assert_eq!(rotated.refresh.as_ref().map(TokenSecret::expose), Some("refresh-2"));
	}

	#[test]
	fn missing_refresh_field_deserializes_as_none() {
		let pair: CredentialPair = serde_json::from_str(r#"{"access":"a"}"#)
			.expect("Credential pair without refresh should deserialize.");

		assert_eq!(pair, CredentialPair::new("a"));
	}
}
