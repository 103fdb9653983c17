//! Resource-owner password grant over the shared transport.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthFuture, Authenticate, Credentials},
	http::{self, HttpRequestSpec, HttpTransport, JsonResponse},
	obs::{self, Stage, StageOutcome, StageSpan},
};

const ACCESS_TOKEN_FIELD: &str = "access_token";

/// Exchanges [`Credentials`] for an access token at a fixed authentication endpoint.
pub struct PasswordAuthenticator<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for the exchange.
	pub transport: Arc<T>,
	/// Credentials sent with every exchange.
	pub credentials: Credentials,
	/// Authentication (token) endpoint.
	pub endpoint: Url,
}
impl<T> PasswordAuthenticator<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an authenticator for `endpoint`.
	pub fn new(transport: Arc<T>, credentials: Credentials, endpoint: Url) -> Self {
		Self { transport, credentials, endpoint }
	}

	/// Builds the form-encoded credential exchange request.
	pub fn request(&self) -> HttpRequestSpec {
		let form = self.credentials.password_grant_form();

		HttpRequestSpec::post(self.endpoint.clone())
			.header("Content-Type", "application/x-www-form-urlencoded")
			.header("Content-Length", form.len().to_string())
			.body(form)
	}

	/// Performs the exchange and extracts the token.
	///
	/// Any non-`2xx` answer is reported as [`Error::AuthenticationFailure`]; transport and
	/// parse failures propagate unchanged.
	pub async fn exchange(&self) -> Result<AccessToken> {
		const STAGE: Stage = Stage::Authenticate;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				match http::send(self.transport.as_ref(), self.request()).await {
					Ok(response) => extract_access_token(response),
					Err(Error::Remote { status, body }) =>
						Err(Error::AuthenticationFailure { upstream_status: status, body }),
					Err(e) => Err(e),
				}
			})
			.await;

		obs::record_result(STAGE, &result);

		result
	}
}
impl<T> Authenticate for PasswordAuthenticator<T>
where
	T: ?Sized + HttpTransport,
{
	fn authenticate(&self) -> AuthFuture<'_> {
		Box::pin(self.exchange())
	}
}
impl<T> Debug for PasswordAuthenticator<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordAuthenticator")
			.field("endpoint", &self.endpoint.as_str())
			.field("credentials", &self.credentials)
			.finish()
	}
}

fn extract_access_token(response: JsonResponse) -> Result<AccessToken> {
	response
		.field(ACCESS_TOKEN_FIELD)
		.and_then(Value::as_str)
		.map(AccessToken::new)
		.ok_or(Error::AuthContract { field: ACCESS_TOKEN_FIELD })
}
