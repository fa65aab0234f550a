//! De-duplicated token refresh cycles.
//!
//! [`Coordinator::ensure_fresh`] evaluates the pre-emptive window (threshold
//! minus cooldown) and, when a refresh is due, funnels into the same cycle
//! machinery the reactive 401 path uses. An `async_lock::Mutex` gate admits one
//! cycle at a time; everyone queued behind it re-checks the cycle counter after
//! acquiring the gate and adopts the finished cycle's outcome — new credential
//! or cloned failure — instead of issuing a second refresh call. Cycle failures
//! clear the stored credential and raise the session-expired signal exactly
//! once.

// self
use crate::{
	_prelude::*,
	coordinator::Coordinator,
	obs::{self, OpKind, OpOutcome, OpSpan},
	session::{Credential, TokenSecret, claims},
	transport::{RequestSpec, Response},
};

/// Failure of a refresh cycle, fanned out identically to every waiter.
///
/// The type is `Clone` on purpose: one cycle has many logical callers, and
/// each of them must observe the same outcome.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint answered with a non-2xx status. A 401 here is
	/// terminal for the session; no retry is ever attempted.
	#[error("Refresh endpoint rejected the cycle (HTTP {status}): {reason}.")]
	Rejected {
		/// Status code returned by the refresh endpoint.
		status: u16,
		/// Server-supplied reason, when one could be extracted.
		reason: String,
	},
	/// Refresh call failed at the transport level.
	#[error("Network error occurred while calling the refresh endpoint: {message}.")]
	Network {
		/// Transport failure summary.
		message: String,
	},
	/// No credential was stored when the cycle started.
	#[error("No credential is available to refresh.")]
	MissingCredential,
	/// The stored credential carries no refresh token.
	#[error("Stored credential has no refresh token.")]
	MissingRefreshToken,
	/// The refresh endpoint answered 2xx but returned no usable access token.
	#[error("Refresh endpoint returned no usable access token.")]
	MissingAccessToken,
	/// The refresh endpoint returned a body that could not be decoded.
	#[error("Refresh endpoint returned an undecodable response: {message}.")]
	Malformed {
		/// Decoding failure summary, including the failing JSON path.
		message: String,
	},
	/// The credential store failed mid-cycle.
	#[error("Credential store failed during the refresh cycle: {message}.")]
	Storage {
		/// Store failure summary.
		message: String,
	},
}

/// Serializes refresh cycles and shares each cycle's outcome with its waiters.
///
/// `completed` counts finished cycles. A caller snapshots it when it decides a
/// refresh is needed (no suspension point sits between the snapshot and the
/// gate acquisition), then compares after acquiring the gate: a higher counter
/// means some other caller already ran the cycle this caller was waiting for.
#[derive(Default)]
pub(crate) struct RefreshGate {
	guard: AsyncMutex<()>,
	state: Mutex<CycleState>,
}
#[derive(Default)]
struct CycleState {
	completed: u64,
	last_outcome: Option<Result<Credential, RefreshError>>,
	last_refresh_at: Option<OffsetDateTime>,
}
impl RefreshGate {
	pub(crate) fn observe(&self) -> u64 {
		self.state.lock().completed
	}

	fn adopt(&self, observed: u64) -> Option<Result<Credential, RefreshError>> {
		let state = self.state.lock();

		if state.completed > observed { state.last_outcome.clone() } else { None }
	}

	fn complete(&self, outcome: Result<Credential, RefreshError>, now: OffsetDateTime) {
		let mut state = self.state.lock();

		state.completed += 1;

		if outcome.is_ok() {
			state.last_refresh_at = Some(now);
		}

		state.last_outcome = Some(outcome);
	}

	fn last_refresh_at(&self) -> Option<OffsetDateTime> {
		self.state.lock().last_refresh_at
	}
}

/// Wire shape of the refresh endpoint response.
///
/// Both the current `accessToken` field name and the legacy `token` one are
/// accepted; `refreshToken` and `expiresIn` are optional because not every
/// backend rotates refresh tokens or reports relative expiry.
#[derive(Debug, Deserialize)]
struct RefreshPayload {
	#[serde(default, rename = "accessToken")]
	access_token: Option<String>,
	#[serde(default)]
	token: Option<String>,
	#[serde(default, rename = "refreshToken")]
	refresh_token: Option<String>,
	#[serde(default, rename = "expiresIn")]
	expires_in: Option<i64>,
}
impl RefreshPayload {
	fn into_credential(
		self,
		previous: Credential,
		now: OffsetDateTime,
	) -> Result<Credential, RefreshError> {
		let access = self
			.access_token
			.or(self.token)
			.filter(|token| !token.is_empty())
			.ok_or(RefreshError::MissingAccessToken)?;
		let expires_at = self
			.expires_in
			.map(|secs| now + Duration::seconds(secs))
			.or_else(|| claims::token_expiry(&access));
		// Absent rotation, the previous refresh token stays valid.
		let refresh_token = self.refresh_token.map(TokenSecret::new).or(previous.refresh_token);

		Ok(Credential { access_token: TokenSecret::new(access), refresh_token, expires_at })
	}
}

impl Coordinator {
	/// Pre-emptively refreshes the credential when it is close to expiry.
	///
	/// Returns whether a refresh cycle ran (or an in-flight one was adopted).
	/// Credentials without a known expiry never refresh pre-emptively, an
	/// already-expired credential bypasses the cooldown, and a still-valid one
	/// inside the cooldown window is left alone.
	pub async fn ensure_fresh(&self) -> Result<bool> {
		let Some(credential) = self.store.get().await? else {
			return Ok(false);
		};
		let now = OffsetDateTime::now_utc();

		if !self.should_refresh(&credential, now) {
			return Ok(false);
		}

		let observed = self.gate.observe();

		self.run_refresh_cycle(observed).await?;

		Ok(true)
	}

	fn should_refresh(&self, credential: &Credential, now: OffsetDateTime) -> bool {
		if credential.expires_at.is_none() {
			return false;
		}
		if credential.is_expired_at(now) {
			return true;
		}
		if let Some(last) = self.gate.last_refresh_at()
			&& now - last < self.config.refresh_cooldown
		{
			return false;
		}

		credential.expires_within(now, self.config.refresh_threshold)
	}

	/// Runs (or adopts) one refresh cycle.
	///
	/// `observed` is the gate counter snapshot taken when the caller decided a
	/// refresh was needed; it is what distinguishes "queued behind the cycle I
	/// triggered" from "arrived after that cycle finished".
	pub(crate) async fn run_refresh_cycle(
		&self,
		observed: u64,
	) -> Result<Credential, RefreshError> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "run_refresh_cycle");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _cycle = self.gate.guard.lock().await;

				if let Some(outcome) = self.gate.adopt(observed) {
					self.counters.record_adoption();

					return outcome;
				}

				self.counters.record_attempt();

				let outcome = match self.call_refresh_endpoint().await {
					Ok(credential) => match self.store.set(credential.clone()).await {
						Ok(()) => Ok(credential),
						Err(e) => Err(RefreshError::Storage { message: e.to_string() }),
					},
					Err(e) => Err(e),
				};

				if outcome.is_ok() {
					self.counters.record_success();
				} else {
					// The session cannot be renewed; drop the credential and
					// tell the host exactly once.
					let _ = self.store.clear().await;

					self.counters.record_failure();
					self.signal.raise();
				}

				self.gate.complete(outcome.clone(), OffsetDateTime::now_utc());

				outcome
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// The single code path that contacts the refresh endpoint.
	///
	/// The refresh request goes out unauthenticated with the refresh token in
	/// the JSON body; the endpoint contract never sees the expiring access
	/// token.
	async fn call_refresh_endpoint(&self) -> Result<Credential, RefreshError> {
		let current = self
			.store
			.get()
			.await
			.map_err(|e| RefreshError::Storage { message: e.to_string() })?
			.ok_or(RefreshError::MissingCredential)?;
		let refresh_token = current
			.refresh_token
			.as_ref()
			.map(|secret| secret.expose().to_owned())
			.ok_or(RefreshError::MissingRefreshToken)?;
		let spec = RequestSpec::post(self.config.refresh_path.clone())
			.with_json(serde_json::json!({ "refreshToken": refresh_token }));
		let response = self
			.transport
			.send(spec)
			.await
			.map_err(|e| RefreshError::Network { message: e.to_string() })?;

		if !response.is_success() {
			return Err(RefreshError::Rejected {
				status: response.status,
				reason: rejection_reason(&response),
			});
		}

		let payload: RefreshPayload = response
			.json()
			.map_err(|e| RefreshError::Malformed { message: e.to_string() })?;

		payload.into_credential(current, OffsetDateTime::now_utc())
	}
}

fn rejection_reason(response: &Response) -> String {
	#[derive(Deserialize)]
	struct ErrorBody {
		#[serde(default)]
		message: Option<String>,
		#[serde(default)]
		error: Option<String>,
	}

	response
		.json::<ErrorBody>()
		.ok()
		.and_then(|body| body.message.or(body.error))
		.unwrap_or_else(|| format!("HTTP {}", response.status))
}
