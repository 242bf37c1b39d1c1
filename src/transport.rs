//! Transport primitives shared by the primary and renewal pipelines.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack. It receives fully resolved
//! [`HttpRequest`] values and returns raw [`HttpResponse`] values for any status; deciding what a
//! status means is left to the pipelines. A transport error therefore always means that no
//! response was received.

// std
use std::ops::Deref;
// crates.io
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, HttpError, TransportError},
};

/// Fully resolved outbound request handed to an [`ApiTransport`].
pub type HttpRequest = http::Request<Vec<u8>>;
/// Raw response returned by an [`ApiTransport`].
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing API and token exchanges.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the response for any HTTP status.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Outbound call as seen by the middleware chain.
///
/// The `retried` flag flips at most once; a request that already went through a credential
/// renewal is never renewed again.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base URL, or an absolute `http(s)://` URL.
	pub path: String,
	/// Query pairs appended to the resolved URL.
	pub query: Vec<(String, String)>,
	/// Request headers; these override the client's default headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for `method` + `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: None,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Sets a header, replacing previous values under the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(Error::Encode)?;

		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Some(bytes);

		Ok(self)
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Opts this request out of credential renewal: an unauthorized response is surfaced (and
	/// tears the session down) without a refresh attempt.
	pub fn without_renewal(mut self) -> Self {
		self.retried = true;

		self
	}

	/// Returns `true` once the request has been through a renewal attempt.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Flips the retried flag; returns `false` when it was already set.
	pub(crate) fn mark_retried(&mut self) -> bool {
		!std::mem::replace(&mut self.retried, true)
	}

	/// Returns the bearer token currently attached to the request, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
	}

	/// Attaches `token` as `Authorization: Bearer <token>`.
	pub fn set_bearer(&mut self, token: &TokenSecret) -> Result<(), ConfigError> {
		self.headers.insert(AUTHORIZATION, token.bearer_header()?);

		Ok(())
	}

	/// Converts into a transport request against the resolved `url`.
	pub(crate) fn into_http(
		self,
		mut url: Url,
		defaults: &HeaderMap,
	) -> Result<HttpRequest, ConfigError> {
		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		let mut headers = defaults.clone();

		headers.extend(self.headers);

		let mut request = http::Request::builder()
			.method(self.method)
			.uri(url.as_str())
			.body(self.body.unwrap_or_default())?;

		*request.headers_mut() = headers;

		Ok(request)
	}
}

/// Successful (or raw) API response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Deserializes the body as JSON, reporting the failing JSON path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		decode_json(&self.body)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}

	/// Returns the body as lossily decoded UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Converts a non-success response into an [`HttpError`].
	pub(crate) fn error_for_status(self) -> Result<Self, HttpError> {
		if self.status.is_success() {
			Ok(self)
		} else {
			Err(HttpError::new(self.status, self.headers, &self.body))
		}
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self { status: parts.status, headers: parts.headers, body }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_headers_override_defaults_and_query_is_appended() {
		let mut defaults = HeaderMap::new();

		defaults.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		defaults.insert("x-client", HeaderValue::from_static("default"));

		let request = ApiRequest::get("items/")
			.query("limit", 10)
			.header(HeaderName::from_static("x-client"), HeaderValue::from_static("override"));
		let url = Url::parse("https://api.example.com/api/items/").expect("URL should parse.");
		let converted = request.into_http(url, &defaults).expect("Request should convert.");

		assert_eq!(converted.uri(), "https://api.example.com/api/items/?limit=10");
		assert_eq!(converted.headers()["x-client"], "override");
		assert_eq!(converted.headers()[CONTENT_TYPE], "application/json");
	}

	#[test]
	fn retried_flag_flips_once() {
		let mut request = ApiRequest::get("items/");

		assert!(!request.is_retried());
		assert!(request.mark_retried());
		assert!(!request.mark_retried());
		assert!(request.is_retried());
		assert!(ApiRequest::get("items/").without_renewal().is_retried());
	}

	#[test]
	fn bearer_round_trips_through_headers() {
		let mut request = ApiRequest::get("items/");

		assert_eq!(request.bearer(), None);

		request.set_bearer(&TokenSecret::new("A2")).expect("Bearer header should build.");

		assert_eq!(request.bearer(), Some("A2"));
	}

	#[test]
	fn json_decode_reports_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			access: String,
		}

		let response = ApiResponse {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: br#"{"access":7}"#.to_vec(),
		};
		let err = response.json::<Payload>().expect_err("Numeric access should not decode.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "access");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
