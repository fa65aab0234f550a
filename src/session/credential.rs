//! The per-session credential record and its freshness helpers.

// self
use crate::{_prelude::*, session::TokenSecret};

/// Credential held for the active session.
///
/// Created at login, replaced in place by every successful refresh cycle, and
/// destroyed at logout or when a refresh cycle fails terminally. `expires_at`
/// is optional because some backends issue opaque tokens without a readable
/// expiry; such credentials never trigger pre-emptive refreshes.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
	/// Short-lived access token attached to outgoing requests.
	pub access_token: TokenSecret,
	/// Longer-lived refresh token used to obtain new access tokens, if issued.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant of the access token, when known.
	pub expires_at: Option<OffsetDateTime>,
}
impl Credential {
	/// Creates a credential holding only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access_token), refresh_token: None, expires_at: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to the provided instant.
	pub fn with_expires_in(mut self, from: OffsetDateTime, delta: Duration) -> Self {
		self.expires_at = Some(from + delta);

		self
	}

	/// Returns `true` when the access token has expired at the provided instant.
	///
	/// A credential without a known expiry is never considered expired.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.map(|expires_at| expires_at <= instant).unwrap_or(false)
	}

	/// Returns `true` when the access token expires within `window` of `instant`.
	pub fn expires_within(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.expires_at.map(|expires_at| expires_at - instant < window).unwrap_or(false)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
