//! Request stage that attaches the stored access credential to outbound calls.

// self
use crate::{
	_prelude::*,
	auth::CredentialKind,
	client::pipeline::{Middleware, Next, PipelineFuture},
	store::{self, CredentialStore},
	transport::ApiRequest,
};

/// Request stage that attaches the stored access credential as a bearer header.
///
/// Never fails on account of the store: read errors are logged and the request goes out
/// unmodified, as it does when no access credential is stored.
pub struct BearerAuth {
	store: Arc<dyn CredentialStore>,
}
impl BearerAuth {
	/// Creates the stage over `store`.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store }
	}
}
impl Middleware for BearerAuth {
	fn handle<'a>(&'a self, mut request: ApiRequest, next: Next<'a>) -> PipelineFuture<'a> {
		Box::pin(async move {
			let access = store::read_token(self.store.as_ref(), CredentialKind::Access)
				.await
				.unwrap_or_else(|_e| {
					obs_event!(warn, error = %_e, "Failed to read the access credential.");

					None
				});

			if let Some(Err(_e)) = access.map(|access| request.set_bearer(&access)) {
				obs_event!(warn, error = %_e, "Stored access credential is not a valid header value.");
			}

			next.run(request).await
		})
	}
}
impl Debug for BearerAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerAuth").finish_non_exhaustive()
	}
}
