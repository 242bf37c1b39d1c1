//! Response stage that renews an expired access credential once per request.
//!
//! [`decide`] is the pure retry-once state machine; [`RefreshCoordinator`] gathers its inputs
//! after a failed call and carries out the decision: propagate, renew and replay, or tear the
//! session down.

mod decision;
mod metrics;

pub use decision::*;
pub use metrics::RenewalMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, TokenSecret},
	client::pipeline::{Middleware, Next, PipelineFuture},
	renewal::{RenewalClient, RenewalOutcome},
	store::{self, CredentialStore},
	teardown::{SessionTeardown, TeardownReason},
	transport::{ApiRequest, ApiResponse},
};

/// How concurrent authorization failures share renewals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalPolicy {
	/// Every failed request renews on its own; concurrent renewals race and the last write wins.
	#[default]
	Independent,
	/// Renewals are serialized; a request that waited behind another renewal replays with the
	/// credential that renewal stored instead of renewing again.
	SingleFlight,
}

/// Response-stage middleware executing [`decide`].
pub struct RefreshCoordinator {
	store: Arc<dyn CredentialStore>,
	renewal: RenewalClient,
	teardown: Arc<SessionTeardown>,
	metrics: Arc<RenewalMetrics>,
	policy: RenewalPolicy,
	single_flight: AsyncMutex<()>,
}
impl RefreshCoordinator {
	/// Creates the coordinator.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		renewal: RenewalClient,
		teardown: Arc<SessionTeardown>,
		policy: RenewalPolicy,
	) -> Self {
		Self {
			store,
			renewal,
			teardown,
			metrics: Default::default(),
			policy,
			single_flight: AsyncMutex::new(()),
		}
	}

	/// Renewal counters.
	pub fn metrics(&self) -> Arc<RenewalMetrics> {
		self.metrics.clone()
	}

	/// Active renewal policy.
	pub fn policy(&self) -> RenewalPolicy {
		self.policy
	}

	async fn recover<'a>(
		&'a self,
		pending: ApiRequest,
		failure: Error,
		next: Next<'a>,
	) -> Result<ApiResponse> {
		let access = self.read(CredentialKind::Access).await;
		let refresh = self.read(CredentialKind::Refresh).await;
		let context = FailureContext {
			unauthorized: failure.is_unauthorized(),
			access_present: access.is_some(),
			refresh_present: refresh.is_some(),
			retried: pending.is_retried(),
		};

		match (decide(context), refresh) {
			(Decision::Propagate, _) => Err(failure),
			(Decision::Renew, Some(refresh)) => self.renew(pending, refresh, failure, next).await,
			(Decision::Renew, None) => self.tear_down(TeardownReason::RenewalUnavailable, failure).await,
			(Decision::Teardown(reason), _) => self.tear_down(reason, failure).await,
		}
	}

	async fn renew<'a>(
		&'a self,
		mut pending: ApiRequest,
		refresh: TokenSecret,
		failure: Error,
		next: Next<'a>,
	) -> Result<ApiResponse> {
		if !pending.mark_retried() {
			return self.tear_down(TeardownReason::RenewalUnavailable, failure).await;
		}

		let guard = match self.policy {
			RenewalPolicy::Independent => None,
			RenewalPolicy::SingleFlight => {
				let guard = self.single_flight.lock().await;

				match self.read(CredentialKind::Access).await {
					None => return self.tear_down(TeardownReason::MissingAccess, failure).await,
					Some(current) if pending.bearer() != Some(current.expose()) => {
						self.metrics.record_skip();

						obs_event!(debug, "Replaying with an access credential renewed concurrently.");

						drop(guard);

						return next.replay(pending).await;
					},
					Some(_) => Some(guard),
				}
			},
		};

		self.metrics.record_attempt();

		match self.renewal.renew(&refresh).await {
			Ok(RenewalOutcome::Renewed(access)) => {
				if let Err(e) = self.store.set(CredentialKind::Access, access.clone()).await {
					self.metrics.record_failure();

					return Err(e.into());
				}

				self.metrics.record_success();

				drop(guard);

				obs_event!(debug, "Access credential renewed; replaying the request.");

				pending.set_bearer(&access)?;

				next.replay(pending).await
			},
			Ok(RenewalOutcome::Missing) => {
				self.metrics.record_failure();

				self.tear_down(TeardownReason::RenewalUnavailable, failure).await
			},
			Err(e) => {
				self.metrics.record_failure();

				obs_event!(warn, error = %e, "Credential renewal failed.");

				self.teardown.run(TeardownReason::RenewalFailed).await;

				Err(Error::Renewal(e))
			},
		}
	}

	async fn tear_down(&self, reason: TeardownReason, failure: Error) -> Result<ApiResponse> {
		obs_event!(
			warn,
			%reason,
			status = ?failure.status(),
			"Tearing the session down after an authorization failure."
		);

		self.teardown.run(reason).await;

		Err(failure)
	}

	async fn read(&self, kind: CredentialKind) -> Option<TokenSecret> {
		store::read_token(self.store.as_ref(), kind).await.unwrap_or_else(|_e| {
			obs_event!(warn, %kind, error = %_e, "Failed to read a stored credential.");

			None
		})
	}
}
impl Middleware for RefreshCoordinator {
	fn handle<'a>(&'a self, request: ApiRequest, next: Next<'a>) -> PipelineFuture<'a> {
		Box::pin(async move {
			let pending = request.clone();

			match next.run(request).await {
				Ok(response) => Ok(response),
				Err(failure) => self.recover(pending, failure, next).await,
			}
		})
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("policy", &self.policy)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}
