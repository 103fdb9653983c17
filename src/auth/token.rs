//! Redacted access token wrapper.

// self
use crate::_prelude::*;

/// Access token issued by the authentication endpoint, redacted in every formatter.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Value of the `Authorization` header carrying this token.
	pub fn authorization(&self) -> String {
		format!("OAuth {}", self.0)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.expose(), "super-secret");
	}

	#[test]
	fn authorization_uses_oauth_scheme() {
		assert_eq!(AccessToken::new("tok-1").authorization(), "OAuth tok-1");
	}
}
