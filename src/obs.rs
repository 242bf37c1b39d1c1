//! Optional observability helpers for client flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `bearer_relay.flow` with the `flow` and
//!   `stage` fields, plus warn/debug events at teardown and renewal decision points.
//! - Enable `metrics` to increment the `bearer_relay_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `bearer_relay_teardown_total` counter labeled by `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// An application call through the primary pipeline.
	Request,
	/// A refresh-credential exchange.
	Renewal,
	/// A username/password exchange at the token endpoint.
	Login,
	/// Clearing credentials and navigating to the login route.
	Teardown,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Request => "request",
			FlowKind::Renewal => "renewal",
			FlowKind::Login => "login",
			FlowKind::Teardown => "teardown",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
