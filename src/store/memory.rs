//! Thread-safe in-memory [`CredentialStore`] for tests, demos, and ephemeral sessions.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<CredentialKind, TokenSecret>>>;

/// Storage backend that keeps both slots in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	/// Seeds a slot; intended for fixtures.
	pub fn with_token(self, kind: CredentialKind, token: impl Into<TokenSecret>) -> Self {
		self.0.write().insert(kind, token.into());

		self
	}

	/// Returns the slot's value without going through the async contract.
	pub fn peek(&self, kind: CredentialKind) -> Option<TokenSecret> {
		self.0.read().get(&kind).cloned()
	}

	/// Returns `true` when neither slot holds a value.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn set_now(map: SlotMap, kind: CredentialKind, token: TokenSecret) -> Result<(), StoreError> {
		map.write().insert(kind, token);

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self, kind: CredentialKind) -> StoreFuture<'_, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&kind).cloned()) })
	}

	fn set(&self, kind: CredentialKind, token: TokenSecret) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, kind, token) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().clear();

			Ok(())
		})
	}
}
