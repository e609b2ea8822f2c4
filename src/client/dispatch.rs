//! Attempt loop shared by every verb.
//!
//! Each call is sent with the credential currently in the store. An expired credential
//! (401) is recovered once through the refresh coordinator and an overload signal (429)
//! is waited out once; anything else, or a repeat of either signal, is reported to the
//! notifier and returned. Failures are reported exactly once, at the point they become
//! terminal.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	client::{ClientInner, refresh::RefreshRole, request::Call},
	error::{RequestError, TransportError},
	http::{ApiRequest, Method},
	notice::Notice,
	obs::{self, CallOutcome, CallSpan, Operation, RecoveryAction},
};

/// Access credential read for one attempt and the refresh generation it belongs to.
struct Bearer {
	access: Option<TokenSecret>,
	generation: u64,
}

#[derive(Serialize)]
struct RefreshExchange<'a> {
	refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshGrant {
	access: String,
	#[serde(default)]
	refresh: Option<String>,
}

impl ClientInner {
	/// Runs `call` to a terminal outcome, recovering at most once per signal.
	pub(crate) async fn execute(&self, call: &Call) -> Result<Value> {
		let op = call.op;
		let span = CallSpan::new(op, "execute");

		obs::record_call_outcome(op, CallOutcome::Attempt);

		let result = span.instrument(self.attempt_with_recovery(call)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(op, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(op, CallOutcome::Failure),
		}

		result
	}

	/// Decodes a payload into the caller's type, reporting shape mismatches.
	pub(crate) fn decode<T>(&self, payload: Value) -> Result<T>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(payload)
			.map_err(|e| self.report(TransportError::decode(e, None).into()))
	}

	/// Hands a terminal failure to the notifier and returns it.
	pub(crate) fn report(&self, error: Error) -> Error {
		self.notifier.notify(&Notice::from_error(&error));

		error
	}

	/// Clears every piece of session state and signals the logout handler.
	pub(crate) async fn end_session(&self) -> Result<()> {
		// Tickets go first so a read settling concurrently cannot refill the cleared cache.
		self.in_flight.clear();
		self.cache.invalidate_all();

		let cleared = self.store.clear().await;

		self.logout.on_logout();

		cleared.map_err(Error::from)
	}

	async fn attempt_with_recovery(&self, call: &Call) -> Result<Value> {
		let mut bearer = self.bearer().await.map_err(|e| self.report(e))?;
		let mut credential_recovered = false;
		let mut backoff_taken = false;

		loop {
			let err = match self.attempt(call, &bearer).await {
				Ok(payload) => return Ok(payload),
				Err(err) => err,
			};

			if err.is_expired_credential() && !credential_recovered {
				credential_recovered = true;
				bearer = self.recover_credential(call.op, bearer.generation, err).await?;

				continue;
			}
			if err.is_overload() && !backoff_taken {
				backoff_taken = true;

				let delay = err
					.retry_after()
					.filter(|d| !d.is_negative())
					.unwrap_or(self.config.default_retry_after);

				obs::record_recovery(call.op, RecoveryAction::Backoff, Some(delay));
				tokio::time::sleep(delay.unsigned_abs()).await;

				bearer = self.bearer().await.map_err(|e| self.report(e))?;

				continue;
			}

			return Err(self.report(err));
		}
	}

	async fn attempt(&self, call: &Call, bearer: &Bearer) -> Result<Value> {
		let response = self.transport.send(call.to_request(bearer.access.clone())).await?;

		response.into_payload()
	}

	/// Reads the generation before the store so a refresh landing in between is seen as
	/// newer than the credential, never older.
	async fn bearer(&self) -> Result<Bearer> {
		let generation = self.refresh.generation();
		let access = self
			.store
			.fetch()
			.await?
			.map(|pair| pair.access)
			.filter(|access| !access.is_blank());

		Ok(Bearer { access, generation })
	}

	/// Obtains a usable credential after `rejected`, an expired-credential failure.
	///
	/// Failures returned from here are already reported.
	async fn recover_credential(
		&self,
		op: Operation,
		observed_generation: u64,
		rejected: Error,
	) -> Result<Bearer> {
		loop {
			match self.refresh.enter(observed_generation) {
				RefreshRole::Superseded => {
					obs::record_recovery(op, RecoveryAction::Replay, None);

					return self.bearer().await.map_err(|e| self.report(e));
				},
				RefreshRole::Subscriber(outcome) => {
					obs::record_recovery(op, RecoveryAction::Subscribe, None);

					// A closed channel means the initiator was dropped mid-exchange; compete
					// for the next refresh. A failed refresh was already reported by its
					// initiator.
					let Ok(outcome) = outcome.await else { continue };
					let access = outcome?;

					return Ok(Bearer { access: Some(access), generation: self.refresh.generation() });
				},
				RefreshRole::Initiator(ticket) => {
					obs::record_recovery(op, RecoveryAction::Refresh, None);

					return match self.refresh_credentials().await {
						Ok(Some(pair)) => {
							ticket.complete(Ok(pair.access.clone()));

							let generation = self.refresh.generation();

							// Let the drained subscribers replay before this call does.
							tokio::task::yield_now().await;

							Ok(Bearer { access: Some(pair.access), generation })
						},
						Ok(None) => {
							ticket.complete(Err(Error::SessionExpired {
								reason: "no refresh credential is stored".into(),
							}));

							let _ = self.end_session().await;

							// Nothing was exchanged, so the server's own rejection is the answer.
							Err(self.report(rejected))
						},
						Err(err) => {
							let expired = Error::SessionExpired { reason: expiry_reason(&err) };

							ticket.complete(Err(expired.clone()));

							let _ = self.end_session().await;

							Err(self.report(expired))
						},
					};
				},
			}
		}
	}

	/// Exchanges the stored refresh credential, or returns `None` when there is none.
	async fn refresh_credentials(&self) -> Result<Option<CredentialPair>> {
		let Some(current) = self.store.fetch().await? else {
			return Ok(None);
		};
		let Some(refresh) = current.refresh.clone().filter(|r| !r.is_blank()) else {
			return Ok(None);
		};
		let metrics = self.refresh.metrics();
		let span = CallSpan::new(Operation::Refresh, "refresh_credentials");

		obs::record_call_outcome(Operation::Refresh, CallOutcome::Attempt);
		metrics.record_attempt();

		let result = span.instrument(self.exchange_refresh(&current, &refresh)).await;

		match &result {
			Ok(_) => {
				metrics.record_success();
				obs::record_call_outcome(Operation::Refresh, CallOutcome::Success);
			},
			Err(_) => {
				metrics.record_failure();
				obs::record_call_outcome(Operation::Refresh, CallOutcome::Failure);
			},
		}

		result.map(Some)
	}

	async fn exchange_refresh(
		&self,
		current: &CredentialPair,
		refresh: &TokenSecret,
	) -> Result<CredentialPair> {
		let url = self.config.refresh_url()?;
		let body = serde_json::to_vec(&RefreshExchange { refresh: refresh.expose() })
			.map_err(RequestError::body)?;
		let payload = self
			.transport
			.send(ApiRequest::new(Method::Post, url).with_json_body(body))
			.await?
			.into_payload()?;
		let grant: RefreshGrant = serde_path_to_error::deserialize(payload)
			.map_err(|e| TransportError::decode(e, None))?;
		let rotated =
			current.rotate(TokenSecret::new(grant.access), grant.refresh.map(TokenSecret::new));

		if rotated.access.is_blank() {
			return Err(Error::SessionExpired {
				reason: "refresh endpoint issued a blank access credential".into(),
			});
		}

		self.store.save(rotated.clone()).await?;

		Ok(rotated)
	}
}

fn expiry_reason(err: &Error) -> String {
	match err {
		Error::SessionExpired { reason } => reason.clone(),
		Error::Transport(TransportError::Network { .. }) =>
			"refresh endpoint could not be reached".into(),
		_ => match err.status() {
			Some(status) => format!("refresh endpoint answered with status {status}"),
			None => "refresh exchange could not be completed".into(),
		},
	}
}
