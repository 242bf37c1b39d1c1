//! Session teardown: clear every credential and send the caller to the login route.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};

/// Navigation side effect invoked after credentials are cleared.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Moves the caller to `route`.
	fn navigate(&self, route: &str);
}
impl<F> Navigator for F
where
	F: Fn(&str) + Send + Sync,
{
	fn navigate(&self, route: &str) {
		self(route)
	}
}

/// Navigator that only remembers the routes it was asked to visit.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator(Arc<Mutex<Vec<String>>>);
impl RecordingNavigator {
	/// Every route visited so far, oldest first.
	pub fn routes(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	/// Most recent route, if any.
	pub fn last(&self) -> Option<String> {
		self.0.lock().last().cloned()
	}

	/// Number of navigations recorded.
	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, route: &str) {
		self.0.lock().push(route.to_owned());
	}
}

/// Why a session was torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeardownReason {
	/// The server rejected a request that carried no access credential.
	MissingAccess,
	/// The refresh endpoint rejected the refresh credential or could not be reached.
	RenewalFailed,
	/// Renewal was not possible: no refresh credential, already retried, or no access returned.
	RenewalUnavailable,
	/// The caller logged out.
	Logout,
}
impl TeardownReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MissingAccess => "missing_access",
			Self::RenewalFailed => "renewal_failed",
			Self::RenewalUnavailable => "renewal_unavailable",
			Self::Logout => "logout",
		}
	}
}
impl Display for TeardownReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Clears the store and navigates to the login route.
pub struct SessionTeardown {
	store: Arc<dyn CredentialStore>,
	navigator: Arc<dyn Navigator>,
	login_route: String,
	count: AtomicU64,
}
impl SessionTeardown {
	/// Creates a teardown bound to `store`, `navigator`, and `login_route`.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		navigator: Arc<dyn Navigator>,
		login_route: impl Into<String>,
	) -> Self {
		Self { store, navigator, login_route: login_route.into(), count: AtomicU64::new(0) }
	}

	/// Clears both credentials, then navigates.
	///
	/// A failing clear is logged and does not prevent navigation.
	pub async fn run(&self, reason: TeardownReason) {
		const KIND: FlowKind = FlowKind::Teardown;

		let span = FlowSpan::new(KIND, reason.as_str());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		obs::record_teardown(reason);

		span.instrument(async {
			match self.store.clear().await {
				Ok(()) => obs_event!(debug, %reason, "Cleared stored credentials."),
				Err(_e) => obs_event!(warn, %reason, error = %_e, "Failed to clear stored credentials."),
			}

			self.count.fetch_add(1, Ordering::Relaxed);
			self.navigator.navigate(&self.login_route);
		})
		.await;

		obs::record_flow_outcome(KIND, FlowOutcome::Success);
	}

	/// Number of teardowns performed.
	pub fn count(&self) -> u64 {
		self.count.load(Ordering::Relaxed)
	}

	/// Route navigated to by [`SessionTeardown::run`].
	pub fn login_route(&self) -> &str {
		&self.login_route
	}
}
impl Debug for SessionTeardown {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTeardown")
			.field("login_route", &self.login_route)
			.field("count", &self.count())
			.finish_non_exhaustive()
	}
}
