//! Relay-level error types shared across the coordinator, stores, and transports.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical relay error exposed by public APIs.
///
/// Non-401 HTTP statuses are never mapped into this enum; they travel back to
/// callers untouched inside [`Response`](crate::transport::Response) so the
/// host application keeps full control over its own status handling.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-store failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Transport failure; no HTTP response was received.
	#[error(transparent)]
	Network(#[from] crate::transport::TransportError),
	/// A refresh cycle failed; the session has been cleared.
	#[error(transparent)]
	Refresh(#[from] crate::coordinator::RefreshError),
	/// The replayed request was still unauthorized after a successful refresh.
	#[error("Request remained unauthorized (HTTP {status}) after a token refresh.")]
	Auth {
		/// Status code returned by the replayed request.
		status: u16,
	},
}
