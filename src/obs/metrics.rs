// self
use crate::{
	obs::{FlowKind, FlowOutcome},
	teardown::TeardownReason,
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bearer_relay_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a session teardown via the global metrics recorder (when enabled).
pub fn record_teardown(reason: TeardownReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("bearer_relay_teardown_total", "reason" => reason.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_safe_without_an_installed_backend() {
		record_flow_outcome(FlowKind::Renewal, FlowOutcome::Failure);
		record_teardown(TeardownReason::RenewalFailed);
	}
}
