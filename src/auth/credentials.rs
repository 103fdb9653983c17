//! Static credentials used for the password grant.

// crates.io
use oauth2::{ClientId, ClientSecret, ResourceOwnerPassword, ResourceOwnerUsername};
// self
use crate::_prelude::*;

/// Resource-owner and client credentials supplied at process start.
///
/// Secrets are redacted by their `Debug` implementations and only leave this struct while
/// the authentication form is encoded. Deserializes from four plain string fields.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "PlainCredentials")]
pub struct Credentials {
	/// Resource-owner username.
	pub username: ResourceOwnerUsername,
	/// Resource-owner password.
	pub password: ResourceOwnerPassword,
	/// OAuth client identifier (consumer key).
	pub client_id: ClientId,
	/// OAuth client secret (consumer secret).
	pub client_secret: ClientSecret,
}
impl Credentials {
	/// Creates credentials from plain strings.
	pub fn new(
		username: impl Into<String>,
		password: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			username: ResourceOwnerUsername::new(username.into()),
			password: ResourceOwnerPassword::new(password.into()),
			client_id: ClientId::new(client_id.into()),
			client_secret: ClientSecret::new(client_secret.into()),
		}
	}

	/// Encodes the `application/x-www-form-urlencoded` password-grant body.
	pub fn password_grant_form(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new())
			.append_pair("username", self.username.as_str())
			.append_pair("password", self.password.secret())
			.append_pair("grant_type", "password")
			.append_pair("client_id", self.client_id.as_str())
			.append_pair("client_secret", self.client_secret.secret())
			.finish()
	}
}

impl From<PlainCredentials> for Credentials {
	fn from(plain: PlainCredentials) -> Self {
		Self::new(plain.username, plain.password, plain.client_id, plain.client_secret)
	}
}

#[derive(Deserialize)]
struct PlainCredentials {
	username: String,
	password: String,
	client_id: String,
	client_secret: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn form_keeps_field_order_and_encodes_values() {
		let credentials = Credentials::new("ops@example.com", "p@ss word&1", "key", "s=cret");

		assert_eq!(
			credentials.password_grant_form(),
			"username=ops%40example.com&password=p%40ss+word%261&grant_type=password\
			 &client_id=key&client_secret=s%3Dcret"
		);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let credentials = Credentials::new("user", "hunter2", "client", "topsecret");
		let rendered = format!("{credentials:?}");

		assert!(!rendered.contains("hunter2"));
		assert!(!rendered.contains("topsecret"));
	}
}
