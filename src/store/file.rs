//! File-backed [`CredentialStore`] whose contents survive process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// On-disk layout: slots keyed by their storage key plus the last write time.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	saved_at: i64,
	slots: BTreeMap<String, TokenSecret>,
}

/// Persists both slots to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<CredentialKind, TokenSecret>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let slots = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(slots)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<CredentialKind, TokenSecret>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(HashMap::new());
		}

		let snapshot: Snapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(snapshot
			.slots
			.into_iter()
			.filter_map(|(key, token)| CredentialKind::from_storage_key(&key).map(|k| (k, token)))
			.collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	/// Writes `slots` to disk; callers swap them into memory only after this succeeds.
	fn persist_locked(&self, slots: &HashMap<CredentialKind, TokenSecret>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot = Snapshot {
			saved_at: OffsetDateTime::now_utc().unix_timestamp(),
			slots: slots
				.iter()
				.map(|(kind, token)| (kind.storage_key().to_owned(), token.clone()))
				.collect(),
		};
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn get(&self, kind: CredentialKind) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().get(&kind).cloned()) })
	}

	fn set(&self, kind: CredentialKind, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			next.insert(kind, token);
			self.persist_locked(&next)?;

			*guard = next;

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(&HashMap::new())?;
			guard.clear();

			Ok(())
		})
	}
}
