//! Opaque bearer token wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

/// Opaque bearer token; expiry is encoded by the issuer and never parsed here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` for empty or whitespace-only tokens, which count as absent.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Builds the `Authorization` header value `Bearer <token>`, marked sensitive.
	pub fn bearer_header(&self) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn bearer_header_is_sensitive() {
		let header = TokenSecret::new("A1").bearer_header().expect("Header should build.");

		assert_eq!(header.to_str().expect("Header should be ASCII."), "Bearer A1");
		assert!(header.is_sensitive());
		assert!(TokenSecret::new("bad\ntoken").bearer_header().is_err());
	}

	#[test]
	fn blank_tokens_are_detected() {
		assert!(TokenSecret::new("").is_blank());
		assert!(TokenSecret::new("  ").is_blank());
		assert!(!TokenSecret::new("A1").is_blank());
	}
}
