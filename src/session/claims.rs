//! Best-effort JWT claim extraction used to derive access-token expiry.
//!
//! The relay never validates signatures; it only reads the `exp` claim so the
//! pre-emptive refresh check has an expiry to compare against. Backends that
//! issue opaque tokens simply yield `None` here and skip pre-emptive refreshes.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

#[derive(Deserialize)]
struct RegisteredClaims {
	#[serde(default)]
	exp: Option<i64>,
}

/// Returns the `exp` claim of a JWT access token as an instant, if present.
pub fn token_expiry(token: &str) -> Option<OffsetDateTime> {
	let payload = decode_payload(token)?;
	let claims: RegisteredClaims = serde_json::from_slice(&payload).ok()?;

	OffsetDateTime::from_unix_timestamp(claims.exp?).ok()
}

fn decode_payload(token: &str) -> Option<Vec<u8>> {
	let mut segments = token.split('.');
	let _header = segments.next()?;
	let payload = segments.next()?;

	// Some emitters pad base64url segments even though RFC 7515 forbids it.
	URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()
}
