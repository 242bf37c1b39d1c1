//! Session state derived from credential presence, plus the protected-route guard.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, TokenSecret},
	store::{self, CredentialStore, StoreError},
};

/// Whether the caller currently holds an access credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Session {
	/// An access credential is stored.
	Authenticated,
	/// No (or a blank) access credential is stored.
	Anonymous,
}
impl Session {
	/// Derives the session from the stored access token.
	pub fn from_access(access: Option<&TokenSecret>) -> Self {
		match access {
			Some(token) if !token.is_blank() => Self::Authenticated,
			_ => Self::Anonymous,
		}
	}

	/// Reads the store and derives the current session.
	pub async fn current(store: &dyn CredentialStore) -> Result<Self, StoreError> {
		let access = store::read_token(store, CredentialKind::Access).await?;

		Ok(Self::from_access(access.as_ref()))
	}

	/// Returns `true` for [`Session::Authenticated`].
	pub fn is_authenticated(self) -> bool {
		matches!(self, Self::Authenticated)
	}

	/// Decides whether a protected route may render or must redirect to `login_route`.
	pub fn guard(self, login_route: &str) -> RouteDecision {
		match self {
			Self::Authenticated => RouteDecision::Proceed,
			Self::Anonymous => RouteDecision::Redirect(login_route.to_owned()),
		}
	}
}
impl Display for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Authenticated => f.write_str("authenticated"),
			Self::Anonymous => f.write_str("anonymous"),
		}
	}
}

/// Outcome of guarding a protected route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
	/// The route may be shown.
	Proceed,
	/// The caller must be sent to the contained route instead.
	Redirect(String),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn blank_access_is_anonymous() {
		assert_eq!(Session::from_access(None), Session::Anonymous);
		assert_eq!(Session::from_access(Some(&TokenSecret::new(""))), Session::Anonymous);
		assert_eq!(Session::from_access(Some(&TokenSecret::new("A1"))), Session::Authenticated);
	}

	#[test]
	fn guard_redirects_anonymous_sessions() {
		assert_eq!(Session::Authenticated.guard("/login"), RouteDecision::Proceed);
		assert_eq!(Session::Anonymous.guard("/login"), RouteDecision::Redirect("/login".into()));
	}

	#[tokio::test]
	async fn current_session_follows_the_store() {
		let store = MemoryStore::default().with_token(CredentialKind::Refresh, "R1");

		assert_eq!(
			Session::current(&store).await.expect("Memory store reads are infallible."),
			Session::Anonymous
		);

		let store = store.with_token(CredentialKind::Access, "A1");

		assert!(
			Session::current(&store)
				.await
				.expect("Memory store reads are infallible.")
				.is_authenticated()
		);
	}
}
