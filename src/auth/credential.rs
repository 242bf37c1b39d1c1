//! Access/refresh credential pair and the storage slots that hold each half.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Which half of a [`Credential`] a storage slot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
	/// Short-lived bearer token attached to API calls.
	Access,
	/// Longer-lived token exchanged for a new access token.
	Refresh,
}
impl CredentialKind {
	/// Both slots, in storage order.
	pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

	/// Returns the fixed storage key for the slot.
	pub const fn storage_key(self) -> &'static str {
		match self {
			Self::Access => "access",
			Self::Refresh => "refresh",
		}
	}

	/// Resolves a storage key back into its slot.
	pub fn from_storage_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.storage_key() == key)
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.storage_key())
	}
}

/// Access and refresh tokens issued together by the token endpoint.
///
/// A half-present pair is never represented: [`Credential::from_parts`] yields `None` unless both
/// tokens exist and are non-blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Access token.
	pub access: TokenSecret,
	/// Refresh token.
	pub refresh: TokenSecret,
}
impl Credential {
	/// Pairs an access token with its refresh token.
	pub fn new(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		Self { access: access.into(), refresh: refresh.into() }
	}

	/// Rebuilds a credential from separately stored halves.
	pub fn from_parts(access: Option<TokenSecret>, refresh: Option<TokenSecret>) -> Option<Self> {
		match (access, refresh) {
			(Some(access), Some(refresh)) if !access.is_blank() && !refresh.is_blank() =>
				Some(Self { access, refresh }),
			_ => None,
		}
	}

	/// Replaces the access token after a renewal; the refresh token is kept.
	pub fn with_access(mut self, access: impl Into<TokenSecret>) -> Self {
		self.access = access.into();

		self
	}

	/// Returns the token stored in the given slot.
	pub fn get(&self, kind: CredentialKind) -> &TokenSecret {
		match kind {
			CredentialKind::Access => &self.access,
			CredentialKind::Refresh => &self.refresh,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn half_present_pairs_are_absent() {
		assert!(Credential::from_parts(Some("A1".into()), None).is_none());
		assert!(Credential::from_parts(None, Some("R1".into())).is_none());
		assert!(Credential::from_parts(Some("".into()), Some("R1".into())).is_none());

		let credential = Credential::from_parts(Some("A1".into()), Some("R1".into()))
			.expect("Both halves should form a credential.");

		assert_eq!(credential.get(CredentialKind::Access).expose(), "A1");
		assert_eq!(credential.get(CredentialKind::Refresh).expose(), "R1");
	}

	#[test]
	fn renewal_keeps_refresh_token() {
		let renewed = Credential::new("A1", "R1").with_access("A2");

		assert_eq!(renewed, Credential::new("A2", "R1"));
	}

	#[test]
	fn storage_keys_round_trip() {
		for kind in CredentialKind::ALL {
			assert_eq!(CredentialKind::from_storage_key(kind.storage_key()), Some(kind));
		}

		assert_eq!(CredentialKind::from_storage_key("username"), None);
	}
}
