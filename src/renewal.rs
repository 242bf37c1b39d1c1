//! Interceptor-free exchanges against the token and refresh endpoints.
//!
//! Requests sent here never pass through the primary middleware chain, so an unauthorized
//! response from the refresh endpoint cannot re-enter the renewal state machine.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	config::ClientConfig,
	error::{ConfigError, RenewalError, body_preview},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::{ApiRequest, ApiResponse, ApiTransport, HttpRequest, decode_json},
};

const REFRESH_TARGET: &str = "the refresh endpoint";
const TOKEN_TARGET: &str = "the token endpoint";

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
	#[serde(default)]
	access: Option<TokenSecret>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
	username: &'a str,
	password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
	access: TokenSecret,
	refresh: TokenSecret,
}

/// Result of a successful refresh-endpoint exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenewalOutcome {
	/// The endpoint issued a new access credential.
	Renewed(TokenSecret),
	/// The endpoint answered with success but without a usable access credential.
	Missing,
}

/// Sends token and refresh exchanges straight to the transport.
#[derive(Clone)]
pub struct RenewalClient {
	transport: Arc<dyn ApiTransport>,
	config: Arc<ClientConfig>,
}
impl RenewalClient {
	/// Creates a client sharing the primary pipeline's transport and configuration.
	pub fn new(transport: Arc<dyn ApiTransport>, config: Arc<ClientConfig>) -> Self {
		Self { transport, config }
	}

	/// Exchanges `refresh` for a new access credential.
	pub async fn renew(&self, refresh: &TokenSecret) -> Result<RenewalOutcome, RenewalError> {
		const KIND: FlowKind = FlowKind::Renewal;

		let span = FlowSpan::new(KIND, "renew");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let body = serde_json::to_vec(&RefreshRequest { refresh: refresh.expose() })
					.map_err(RenewalError::Encode)?;
				let request = self.prepare(self.config.refresh_url()?, body)?;
				let response = ApiResponse::from(
					self.transport
						.execute(request)
						.await
						.map_err(|e| e.retarget(REFRESH_TARGET))?,
				);
				let status = response.status.as_u16();

				if !response.status.is_success() {
					return Err(RenewalError::Rejected { status, body: body_preview(&response.body) });
				}
				if response.body.iter().all(u8::is_ascii_whitespace) {
					return Ok(RenewalOutcome::Missing);
				}

				let payload: RefreshResponse = decode_json(&response.body)
					.map_err(|source| RenewalError::Parse { source, status })?;

				Ok(match payload.access.filter(|token| !token.is_blank()) {
					Some(access) => RenewalOutcome::Renewed(access),
					None => RenewalOutcome::Missing,
				})
			})
			.await;

		match &result {
			Ok(RenewalOutcome::Renewed(_)) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Exchanges a username and password for a fresh credential pair.
	///
	/// Any non-success status is reported as [`Error::Authentication`].
	pub async fn obtain(&self, username: &str, password: &str) -> Result<Credential> {
		let body = serde_json::to_vec(&LoginRequest { username, password }).map_err(Error::Encode)?;
		let request = self.prepare(self.config.token_url()?, body)?;
		let response = ApiResponse::from(
			self.transport.execute(request).await.map_err(|e| e.retarget(TOKEN_TARGET))?,
		);

		if !response.status.is_success() {
			return Err(Error::Authentication {
				status: response.status.as_u16(),
				body: body_preview(&response.body),
			});
		}

		let LoginResponse { access, refresh } = response.json()?;

		Ok(Credential { access, refresh })
	}

	fn prepare(&self, url: Url, body: Vec<u8>) -> Result<HttpRequest, ConfigError> {
		ApiRequest::post(url.as_str()).body(body).into_http(url, &self.config.default_headers)
	}
}
impl Debug for RenewalClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RenewalClient")
			.field("token_path", &self.config.token_path)
			.field("refresh_path", &self.config.refresh_path)
			.finish_non_exhaustive()
	}
}
