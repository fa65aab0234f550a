//! Storage contracts and built-in credential store implementations.
//!
//! The coordinator treats persistence as an external collaborator behind the
//! [`CredentialStore`] trait: fetch the current credential, replace it after a
//! successful refresh, and clear it when the session ends. [`MemoryStore`]
//! covers tests and short-lived processes; [`FileStore`] survives restarts.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, session::Credential};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the session credential.
///
/// Implementations hold at most one credential per store; the coordinator owns
/// all mutation ordering, so stores only need to be internally consistent, not
/// transactional.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the current credential, if a session is active.
	fn get(&self) -> StoreFuture<'_, Option<Credential>>;

	/// Persists or replaces the session credential.
	fn set(&self, credential: Credential) -> StoreFuture<'_, ()>;

	/// Removes the session credential.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
