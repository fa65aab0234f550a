//! Authenticated request dispatch with replay-on-401.

// self
use crate::{
	_prelude::*,
	coordinator::Coordinator,
	obs::{self, OpKind, OpOutcome, OpSpan},
	session::Credential,
	transport::{AUTHORIZATION_HEADER, RequestSpec, Response},
};

impl Coordinator {
	/// Sends one request on behalf of a caller.
	///
	/// The spec is cloned before any header is touched, so the caller's copy
	/// stays untouched across retries. Requests to the login or refresh paths
	/// go out unauthenticated; everything else gets the current bearer token,
	/// a pre-emptive freshness check first, and — on a 401 — exactly one
	/// refresh-and-replay. Every non-401 status (success or not) is returned
	/// as-is; the relay never interprets other status codes.
	pub async fn request(&self, spec: &RequestSpec) -> Result<Response> {
		const KIND: OpKind = OpKind::Request;

		let span = OpSpan::new(KIND, "request");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.dispatch(spec.clone())).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn dispatch(&self, spec: RequestSpec) -> Result<Response> {
		if self.config.is_auth_path(&spec.path) {
			return self.dispatch_unauthenticated(spec).await;
		}

		self.ensure_fresh().await?;

		// Snapshot before sending: a refresh finishing while this request is
		// in flight counts as the cycle that answers its 401.
		let observed = self.gate.observe();
		let credential = self.store.get().await?;
		let response =
			self.transport.send(authenticated(spec.clone(), credential.as_ref())).await?;

		if response.status != 401 {
			return Ok(response);
		}

		let renewed = self.run_refresh_cycle(observed).await?;
		let replay = self.transport.send(authenticated(spec, Some(&renewed))).await?;

		// A 401 on the replay means the fresh token is unusable too; surface
		// it instead of looping into another refresh.
		if replay.status == 401 {
			return Err(Error::Auth { status: replay.status });
		}

		Ok(replay)
	}

	async fn dispatch_unauthenticated(&self, mut spec: RequestSpec) -> Result<Response> {
		spec.headers.remove(AUTHORIZATION_HEADER);

		let terminal = self.config.is_refresh_path(&spec.path);
		let response = self.transport.send(spec).await?;

		// The refresh endpoint rejecting its own credential is the end of the
		// session; there is nothing left to retry with.
		if terminal && response.status == 401 {
			let _ = self.store.clear().await;

			self.signal.raise();
		}

		Ok(response)
	}
}

fn authenticated(mut spec: RequestSpec, credential: Option<&Credential>) -> RequestSpec {
	if let Some(credential) = credential {
		spec.headers.insert(
			AUTHORIZATION_HEADER.to_owned(),
			format!("Bearer {}", credential.access_token.expose()),
		);
	}

	spec
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authenticated_attaches_a_bearer_header_without_mutating_the_original() {
		let spec = RequestSpec::get("/jobs");
		let credential = Credential::new("abc123");
		let signed = authenticated(spec.clone(), Some(&credential));

		assert_eq!(
			signed.headers.get(AUTHORIZATION_HEADER).map(String::as_str),
			Some("Bearer abc123"),
		);
		assert!(spec.headers.is_empty());
	}

	#[test]
	fn authenticated_is_a_no_op_without_a_credential() {
		let signed = authenticated(RequestSpec::get("/jobs"), None);

		assert!(signed.headers.is_empty());
	}
}
