//! Credential storage contract and built-in store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, TokenSecret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value holder for the access and refresh tokens.
///
/// Stores provide no cross-operation locking; the last writer wins.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the token held in `kind`'s slot, if any.
	fn get(&self, kind: CredentialKind) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Persists `token` into `kind`'s slot, replacing any previous value.
	fn set(&self, kind: CredentialKind, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes both tokens.
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

/// Reads a slot and treats blank tokens as absent.
pub async fn read_token(
	store: &dyn CredentialStore,
	kind: CredentialKind,
) -> Result<Option<TokenSecret>, StoreError> {
	Ok(store.get(kind).await?.filter(|token| !token.is_blank()))
}

/// Loads the full credential pair; a half-present pair yields `None`.
pub async fn load_credential(store: &dyn CredentialStore) -> Result<Option<Credential>, StoreError> {
	let access = store.get(CredentialKind::Access).await?;
	let refresh = store.get(CredentialKind::Refresh).await?;

	Ok(Credential::from_parts(access, refresh))
}

/// Writes both halves of `credential`.
pub async fn save_credential(
	store: &dyn CredentialStore,
	credential: &Credential,
) -> Result<(), StoreError> {
	for kind in CredentialKind::ALL {
		store.set(kind, credential.get(kind).clone()).await?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[tokio::test]
	async fn credential_helpers_round_trip_through_a_store() {
		let store = MemoryStore::default();

		save_credential(&store, &Credential::new("A1", "R1"))
			.await
			.expect("Saving into the memory store should succeed.");

		let loaded = load_credential(&store)
			.await
			.expect("Loading from the memory store should succeed.")
			.expect("Both halves were saved.");

		assert_eq!(loaded, Credential::new("A1", "R1"));

		store.set(CredentialKind::Access, "".into()).await.expect("Blank writes are accepted.");

		assert_eq!(
			read_token(&store, CredentialKind::Access).await.expect("Read should succeed."),
			None
		);
		assert!(load_credential(&store).await.expect("Read should succeed.").is_none());
	}
}
