//! Primary client: bearer attachment, caller middleware, and the refresh coordinator in front of
//! a shared transport.
//!
//! Every application call goes through [`ApiClient::send`]. The chain always starts with
//! [`BearerAuth`] and ends with the [`RefreshCoordinator`]; middleware registered on the builder
//! runs in between, so a replay after renewal passes through it again with the new credential.

pub mod bearer;
pub mod pipeline;

pub use bearer::BearerAuth;
pub use pipeline::{Middleware, Next, Pipeline, PipelineFuture};

// self
use crate::{
	_prelude::*,
	auth::{Credential, RouteDecision, Session},
	config::ClientConfig,
	coordinator::{RefreshCoordinator, RenewalMetrics},
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	renewal::RenewalClient,
	resource::Resource,
	store::{self, CredentialStore, MemoryStore},
	teardown::{Navigator, RecordingNavigator, SessionTeardown, TeardownReason},
	transport::{ApiRequest, ApiResponse, ApiTransport},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

/// Bearer-authenticated API client.
///
/// Cloning is cheap; clones share the pipeline, store, and counters.
#[derive(Clone)]
pub struct ApiClient {
	pipeline: Arc<Pipeline>,
	renewal: RenewalClient,
	store: Arc<dyn CredentialStore>,
	teardown: Arc<SessionTeardown>,
	metrics: Arc<RenewalMetrics>,
	config: Arc<ClientConfig>,
}
impl ApiClient {
	/// Starts building a client for `config`.
	pub fn builder(config: ClientConfig) -> ApiClientBuilder {
		ApiClientBuilder {
			config,
			transport: None,
			store: None,
			navigator: None,
			middleware: Vec::new(),
		}
	}

	/// Creates a reqwest-backed client with an in-memory store and a recording navigator.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
		Self::builder(config).build()
	}

	/// Sends `request` through the full chain.
	///
	/// Non-success statuses come back as [`Error::Http`]; an unauthorized response is renewed
	/// at most once before it is surfaced.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::for_request(KIND, "send", &request.method, &request.path);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.pipeline.execute(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Sends a `GET`.
	pub async fn get(&self, path: impl Into<String>) -> Result<ApiResponse> {
		self.send(ApiRequest::get(path)).await
	}

	/// Sends a `GET` and decodes the JSON body.
	pub async fn get_json<T>(&self, path: impl Into<String>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.get(path).await?.json()
	}

	/// Sends a `POST` with a JSON body.
	pub async fn post_json<B>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.send(ApiRequest::post(path).json(body)?).await
	}

	/// Sends a `PUT` with a JSON body.
	pub async fn put_json<B>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.send(ApiRequest::put(path).json(body)?).await
	}

	/// Sends a `PATCH` with a JSON body.
	pub async fn patch_json<B>(&self, path: impl Into<String>, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.send(ApiRequest::patch(path).json(body)?).await
	}

	/// Sends a `DELETE`.
	pub async fn delete(&self, path: impl Into<String>) -> Result<ApiResponse> {
		self.send(ApiRequest::delete(path)).await
	}

	/// Exchanges a username and password at the token endpoint and stores both credentials.
	///
	/// The exchange bypasses the middleware chain. On failure the store is left untouched.
	pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let credential = self.renewal.obtain(username, password).await.inspect_err(|_e| {
					obs_event!(warn, error = %_e, "Login exchange failed.");
				})?;

				store::save_credential(self.store.as_ref(), &credential).await?;

				Ok(credential)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Clears both credentials and navigates to the login route.
	pub async fn logout(&self) {
		self.teardown.run(TeardownReason::Logout).await;
	}

	/// Current session derived from the stored access credential.
	pub async fn session(&self) -> Result<Session> {
		Ok(Session::current(self.store.as_ref()).await?)
	}

	/// Decides whether a protected route may be shown.
	pub async fn guard(&self) -> Result<RouteDecision> {
		Ok(self.session().await?.guard(&self.config.login_route))
	}

	/// REST helper bound to `collection` (for example `"transactions/invoice/"`).
	pub fn resource(&self, collection: impl Into<String>) -> Resource<'_> {
		Resource::new(self, collection)
	}

	/// Renewal counters shared by every clone.
	pub fn renewal_metrics(&self) -> &RenewalMetrics {
		&self.metrics
	}

	/// Number of session teardowns performed.
	pub fn teardown_count(&self) -> u64 {
		self.teardown.count()
	}

	/// Backing credential store.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("pipeline", &self.pipeline)
			.field("renewal_policy", &self.config.renewal_policy)
			.finish_non_exhaustive()
	}
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
	config: ClientConfig,
	transport: Option<Arc<dyn ApiTransport>>,
	store: Option<Arc<dyn CredentialStore>>,
	navigator: Option<Arc<dyn Navigator>>,
	middleware: Vec<Arc<dyn Middleware>>,
}
impl ApiClientBuilder {
	/// Uses `transport` for both the primary and renewal pipelines.
	pub fn transport(mut self, transport: Arc<dyn ApiTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Uses `store` for credentials; defaults to a fresh [`MemoryStore`].
	pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Uses `navigator` on teardown; defaults to a [`RecordingNavigator`].
	pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
		self.navigator = Some(navigator);

		self
	}

	/// Appends a stage between bearer attachment and the refresh coordinator.
	pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middleware.push(middleware);

		self
	}

	/// Wires the pipelines together.
	pub fn build(self) -> Result<ApiClient, ConfigError> {
		let Self { config, transport, store, navigator, middleware } = self;
		let transport = match transport {
			Some(transport) => transport,
			None => default_transport()?,
		};
		let store = store.unwrap_or_else(|| Arc::new(MemoryStore::default()));
		let navigator = navigator.unwrap_or_else(|| Arc::new(RecordingNavigator::default()));
		let config = Arc::new(config);
		let renewal = RenewalClient::new(transport.clone(), config.clone());
		let teardown = Arc::new(SessionTeardown::new(
			store.clone(),
			navigator,
			config.login_route.clone(),
		));
		let coordinator = RefreshCoordinator::new(
			store.clone(),
			renewal.clone(),
			teardown.clone(),
			config.renewal_policy,
		);
		let metrics = coordinator.metrics();
		let mut chain: Vec<Arc<dyn Middleware>> = Vec::with_capacity(middleware.len() + 2);

		chain.push(Arc::new(BearerAuth::new(store.clone())));
		chain.extend(middleware);
		chain.push(Arc::new(coordinator));

		let pipeline = Arc::new(Pipeline::new(chain, transport, config.clone()));

		Ok(ApiClient { pipeline, renewal, store, teardown, metrics, config })
	}
}
impl Debug for ApiClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClientBuilder")
			.field("config", &self.config)
			.field("transport_set", &self.transport.is_some())
			.field("store_set", &self.store.is_some())
			.field("middleware", &self.middleware.len())
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_transport() -> Result<Arc<dyn ApiTransport>, ConfigError> {
	let client = ReqwestClient::builder().build()?;

	Ok(Arc::new(ReqwestTransport::with_client(client)))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport() -> Result<Arc<dyn ApiTransport>, ConfigError> {
	Err(ConfigError::MissingTransport)
}
