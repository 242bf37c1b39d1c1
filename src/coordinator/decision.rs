// self
use crate::teardown::TeardownReason;

/// Facts the coordinator gathers after a failed call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailureContext {
	/// The failure is an HTTP 401.
	pub unauthorized: bool,
	/// A non-blank access credential is stored.
	pub access_present: bool,
	/// A non-blank refresh credential is stored.
	pub refresh_present: bool,
	/// The request has already been through a renewal.
	pub retried: bool,
}

/// What the coordinator does with a failed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	/// Return the failure unchanged.
	Propagate,
	/// Exchange the refresh credential, then replay the request.
	Renew,
	/// Clear the session, navigate to login, and return the original failure.
	Teardown(TeardownReason),
}

/// Retry-once state machine over a failed call.
pub fn decide(context: FailureContext) -> Decision {
	let FailureContext { unauthorized, access_present, refresh_present, retried } = context;

	if !unauthorized {
		return Decision::Propagate;
	}
	if !access_present {
		return Decision::Teardown(TeardownReason::MissingAccess);
	}
	if refresh_present && !retried {
		return Decision::Renew;
	}

	Decision::Teardown(TeardownReason::RenewalUnavailable)
}
