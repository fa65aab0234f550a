//! Thread-safe in-memory [`CredentialStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	session::Credential,
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<Credential>>>;

/// Keeps the session credential in-process; contents vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	fn get_now(slot: Slot) -> Option<Credential> {
		slot.read().clone()
	}

	fn set_now(slot: Slot, credential: Credential) -> Result<(), StoreError> {
		*slot.write() = Some(credential);

		Ok(())
	}

	fn clear_now(slot: Slot) -> Result<(), StoreError> {
		*slot.write() = None;

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self) -> StoreFuture<'_, Option<Credential>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(slot)) })
	}

	fn set(&self, credential: Credential) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::set_now(slot, credential) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::clear_now(slot) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn set_get_clear_round_trip() {
		let store = MemoryStore::default();

		assert!(store.get().await.expect("Empty store read should succeed.").is_none());

		store
			.set(Credential::new("access-1").with_refresh_token("refresh-1"))
			.await
			.expect("Storing a credential should succeed.");

		let fetched = store
			.get()
			.await
			.expect("Store read should succeed.")
			.expect("Credential should be present after set.");

		assert_eq!(fetched.access_token.expose(), "access-1");

		store.clear().await.expect("Clearing the store should succeed.");

		assert!(store.get().await.expect("Cleared store read should succeed.").is_none());
	}
}
