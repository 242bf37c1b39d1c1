//! Client configuration: base URL normalization, endpoint paths, and the teardown route.

// crates.io
use http::header::{CONTENT_TYPE, HeaderName};
// self
use crate::{_prelude::*, coordinator::RenewalPolicy, error::ConfigError};

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "BEARER_RELAY_API_URL";

/// Endpoints, routes, and policies shared by every pipeline of an [`ApiClient`].
///
/// [`ApiClient`]: crate::client::ApiClient
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API base URL; always ends with `/`.
	pub base_url: Url,
	/// Token endpoint path, relative to the base URL.
	pub token_path: String,
	/// Refresh endpoint path, relative to the base URL.
	pub refresh_path: String,
	/// Route navigated to on teardown.
	pub login_route: String,
	/// How concurrent renewals are coordinated.
	pub renewal_policy: RenewalPolicy,
	/// Headers sent with every request unless a request overrides them.
	pub default_headers: HeaderMap,
}
impl ClientConfig {
	/// Default token endpoint path.
	pub const DEFAULT_TOKEN_PATH: &'static str = "token/";
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "token/refresh/";
	/// Default unauthenticated entry route.
	pub const DEFAULT_LOGIN_ROUTE: &'static str = "/login";

	/// Creates a configuration for `base_url`, appending a trailing `/` when missing.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		let raw = base_url.as_ref().trim();
		let mut base_url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
			value: raw.to_owned(),
			source: Some(source),
		})?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { value: raw.to_owned(), source: None });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let mut default_headers = HeaderMap::new();

		default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(Self {
			base_url,
			token_path: Self::DEFAULT_TOKEN_PATH.into(),
			refresh_path: Self::DEFAULT_REFRESH_PATH.into(),
			login_route: Self::DEFAULT_LOGIN_ROUTE.into(),
			renewal_policy: RenewalPolicy::default(),
			default_headers,
		})
	}

	/// Reads the base URL from [`BASE_URL_ENV`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the base URL through `lookup`, which maps variable names to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: FnOnce(&str) -> Option<String>,
	{
		let value = lookup(BASE_URL_ENV)
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingBaseUrl { variable: BASE_URL_ENV })?;

		Self::new(value)
	}

	/// Overrides the token endpoint path.
	pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the teardown route.
	pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the renewal policy.
	pub fn with_renewal_policy(mut self, policy: RenewalPolicy) -> Self {
		self.renewal_policy = policy;

		self
	}

	/// Adds or replaces a default header.
	pub fn with_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.default_headers.insert(name, value);

		self
	}

	/// Resolves a request path against the base URL.
	///
	/// Leading slashes are stripped so `"/api/items/"` stays under the base path; absolute
	/// `http(s)://` URLs are used verbatim.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let invalid = |source| ConfigError::InvalidPath { path: path.to_owned(), source };

		if is_absolute(path) {
			return Url::parse(path).map_err(invalid);
		}

		self.base_url.join(path.trim_start_matches('/')).map_err(invalid)
	}

	/// Resolved token endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.token_path)
	}

	/// Resolved refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.refresh_path)
	}
}

fn is_absolute(path: &str) -> bool {
	let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();

	lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_url_gains_trailing_slash() {
		let config = ClientConfig::new("https://backend.example.com/api")
			.expect("Base URL should parse.");

		assert_eq!(config.base_url.as_str(), "https://backend.example.com/api/");
		assert_eq!(
			config.refresh_url().expect("Refresh URL should resolve.").as_str(),
			"https://backend.example.com/api/token/refresh/"
		);
	}

	#[test]
	fn leading_slash_paths_stay_under_base_path() {
		let config = ClientConfig::new("https://backend.example.com/api/")
			.expect("Base URL should parse.");

		for path in ["/transactions/invoice/", "transactions/invoice/", "//transactions/invoice/"] {
			assert_eq!(
				config.resolve(path).expect("Path should resolve.").as_str(),
				"https://backend.example.com/api/transactions/invoice/"
			);
		}
	}

	#[test]
	fn absolute_paths_are_used_verbatim() {
		let config =
			ClientConfig::new("https://backend.example.com/api/").expect("Base URL should parse.");

		assert_eq!(
			config.resolve("https://other.example.com/health").expect("URL should parse.").as_str(),
			"https://other.example.com/health"
		);
	}

	#[test]
	fn env_lookup_requires_a_value() {
		let err = ClientConfig::from_lookup(|_| None).expect_err("Missing variable should fail.");

		assert!(matches!(err, ConfigError::MissingBaseUrl { variable: BASE_URL_ENV }));

		let err = ClientConfig::from_lookup(|_| Some("  ".into()))
			.expect_err("Blank variable should fail.");

		assert!(matches!(err, ConfigError::MissingBaseUrl { .. }));

		let config = ClientConfig::from_lookup(|key| {
			assert_eq!(key, BASE_URL_ENV);

			Some("http://localhost:8000/api/".into())
		})
		.expect("Lookup value should parse.");

		assert_eq!(config.login_route, ClientConfig::DEFAULT_LOGIN_ROUTE);
		assert_eq!(config.default_headers[CONTENT_TYPE], "application/json");
	}

	#[test]
	fn rejects_non_base_urls() {
		assert!(matches!(
			ClientConfig::new("mailto:ops@example.com"),
			Err(ConfigError::InvalidBaseUrl { source: None, .. })
		));
		assert!(matches!(
			ClientConfig::new("not a url"),
			Err(ConfigError::InvalidBaseUrl { source: Some(_), .. })
		));
	}
}
