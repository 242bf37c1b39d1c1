//! Middleware chain shared by every call of the primary client.

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	transport::{ApiRequest, ApiResponse, ApiTransport},
};

/// Boxed future returned by middleware stages.
pub type PipelineFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// A stage wrapped around the transport: `(request, next) -> outcome`.
///
/// A stage may rewrite the request before calling [`Next::run`], inspect or replace the outcome
/// afterwards, or restart the whole chain with [`Next::replay`].
pub trait Middleware
where
	Self: Send + Sync,
{
	/// Handles `request`, delegating to the remainder of the chain through `next`.
	fn handle<'a>(&'a self, request: ApiRequest, next: Next<'a>) -> PipelineFuture<'a>;
}

/// Handle to the remainder of the chain after the current stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
	pipeline: &'a Pipeline,
	position: usize,
}
impl<'a> Next<'a> {
	/// Passes `request` to the following stage, or to the transport after the last stage.
	pub fn run(self, request: ApiRequest) -> PipelineFuture<'a> {
		self.pipeline.run_from(self.position, request)
	}

	/// Re-issues `request` through the full chain, starting from the first stage.
	pub fn replay(self, request: ApiRequest) -> PipelineFuture<'a> {
		self.pipeline.run_from(0, request)
	}
}
impl Debug for Next<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Next").field("position", &self.position).finish()
	}
}

/// Ordered middleware stages in front of an [`ApiTransport`].
pub struct Pipeline {
	chain: Vec<Arc<dyn Middleware>>,
	transport: Arc<dyn ApiTransport>,
	config: Arc<ClientConfig>,
}
impl Pipeline {
	/// Creates a pipeline; stages run in the order given.
	pub fn new(
		chain: Vec<Arc<dyn Middleware>>,
		transport: Arc<dyn ApiTransport>,
		config: Arc<ClientConfig>,
	) -> Self {
		Self { chain, transport, config }
	}

	/// Sends `request` through every stage.
	pub fn execute(&self, request: ApiRequest) -> PipelineFuture<'_> {
		self.run_from(0, request)
	}

	/// Number of middleware stages.
	pub fn len(&self) -> usize {
		self.chain.len()
	}

	/// Returns `true` when the pipeline talks to the transport directly.
	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}

	fn run_from(&self, position: usize, request: ApiRequest) -> PipelineFuture<'_> {
		match self.chain.get(position) {
			Some(stage) => stage.handle(request, Next { pipeline: self, position: position + 1 }),
			None => Box::pin(self.dispatch(request)),
		}
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let url = self.config.resolve(&request.path)?;
		let request = request.into_http(url, &self.config.default_headers)?;
		let response = self.transport.execute(request).await?;

		Ok(ApiResponse::from(response).error_for_status()?)
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline").field("stages", &self.chain.len()).finish_non_exhaustive()
	}
}
