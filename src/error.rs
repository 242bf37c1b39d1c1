//! Client-level error types shared by the pipelines, stores, and renewal exchanges.

// crates.io
use http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was received (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The server answered with a non-success status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// Exchanging the refresh credential failed; the session has been torn down.
	#[error(transparent)]
	Renewal(#[from] RenewalError),

	/// The token endpoint rejected a username/password exchange.
	#[error("Token endpoint rejected the credentials with status {status}.")]
	Authentication {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Request payload could not be serialized.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
	/// Response payload could not be deserialized into the requested type.
	#[error("Response body with status {status} could not be decoded.")]
	Decode {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the decoded response.
		status: u16,
	},
}
impl Error {
	/// Returns `true` when the server rejected the request as unauthorized (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Http(e) if e.is_unauthorized())
	}

	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Http(e) => Some(e.status),
			Self::Renewal(RenewalError::Rejected { status, .. }) =>
				StatusCode::from_u16(*status).ok(),
			Self::Authentication { status, .. } | Self::Decode { status, .. } =>
				StatusCode::from_u16(*status).ok(),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The base URL environment variable is not set.
	#[error("Environment variable `{variable}` must hold the API base URL.")]
	MissingBaseUrl {
		/// Name of the variable that was consulted.
		variable: &'static str,
	},
	/// The base URL cannot be parsed or cannot carry a path.
	#[error("API base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value supplied by the caller.
		value: String,
		/// Underlying parsing failure, when available.
		#[source]
		source: Option<url::ParseError>,
	},
	/// A request path cannot be joined onto the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// A header value contains characters HTTP does not allow.
	#[error("Header value is not valid HTTP.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No transport was supplied and no default transport is compiled in.
	#[error("No HTTP transport is configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO); no response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Short label of the endpoint family that was being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the API", source: Box::new(src) }
	}

	pub(crate) fn retarget(self, target: &'static str) -> Self {
		match self {
			Self::Network { source, .. } => Self::Network { target, source },
			other => other,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-success HTTP response returned by the API.
#[derive(Clone, Debug, ThisError)]
#[error("Server responded with status {status}.")]
pub struct HttpError {
	/// Response status.
	pub status: StatusCode,
	/// Truncated, lossily decoded response body.
	pub body: String,
	/// Response headers.
	pub headers: HeaderMap,
}
impl HttpError {
	/// Builds an error from a status, headers, and raw body.
	pub fn new(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
		Self { status, body: body_preview(body), headers }
	}

	/// Returns `true` for the unauthorized status class that triggers renewal.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Returns the `Retry-After` hint (delta seconds or an HTTP date), if the server sent one.
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

		if let Ok(secs) = raw.parse::<u32>() {
			return Some(Duration::seconds(secs.into()));
		}

		let delta = OffsetDateTime::parse(raw, &Rfc2822).ok()? - OffsetDateTime::now_utc();

		delta.is_positive().then_some(delta)
	}
}

/// Failures raised while exchanging a refresh credential.
#[derive(Debug, ThisError)]
pub enum RenewalError {
	/// The refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh credential with status {status}.")]
	Rejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// The refresh endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The refresh endpoint responded with malformed JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response.
		status: u16,
	},
	/// The renewal request could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The refresh payload could not be serialized.
	#[error("Refresh payload could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
}

/// Lossily decodes and truncates a response body for error reporting.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}... ({} bytes total)", &text[..end], body.len())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unauthorized_is_detected_only_for_401() {
		let unauthorized: Error =
			HttpError::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), b"expired").into();
		let forbidden: Error =
			HttpError::new(StatusCode::FORBIDDEN, HeaderMap::new(), b"nope").into();

		assert!(unauthorized.is_unauthorized());
		assert!(!forbidden.is_unauthorized());
		assert_eq!(forbidden.status(), Some(StatusCode::FORBIDDEN));
	}

	#[test]
	fn renewal_rejection_is_not_an_unauthorized_api_failure() {
		let err: Error = RenewalError::Rejected { status: 401, body: String::new() }.into();

		assert!(!err.is_unauthorized());
		assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
	}

	#[test]
	fn rate_limited_responses_expose_retry_after() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));

		let limited = HttpError::new(StatusCode::TOO_MANY_REQUESTS, headers, b"slow down");

		assert_eq!(limited.retry_after(), Some(Duration::seconds(30)));

		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		let past = HttpError::new(StatusCode::SERVICE_UNAVAILABLE, headers, b"");

		assert_eq!(past.retry_after(), None);
		assert_eq!(
			HttpError::new(StatusCode::TOO_MANY_REQUESTS, HeaderMap::new(), b"").retry_after(),
			None
		);
	}

	#[test]
	fn body_preview_truncates_on_char_boundary() {
		let body = "é".repeat(BODY_PREVIEW_LIMIT);
		let preview = body_preview(body.as_bytes());

		assert!(preview.ends_with(&format!("({} bytes total)", body.len())));
		assert!(preview.len() < body.len());
		assert_eq!(body_preview(b"short"), "short");
	}
}
