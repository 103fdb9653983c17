//! Business REST call carrying the call key.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	event::BusinessId,
	http::{self, HttpRequestSpec, HttpTransport, JsonResponse},
	obs::{self, Stage, StageOutcome, StageSpan},
};

/// Posts `{"vendorCallKey": <id>}` to a fixed REST endpoint.
pub struct RestInvoker<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for the call.
	pub transport: Arc<T>,
	/// Business REST endpoint.
	pub endpoint: Url,
}
impl<T> RestInvoker<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an invoker for `endpoint`.
	pub fn new(transport: Arc<T>, endpoint: Url) -> Self {
		Self { transport, endpoint }
	}

	/// Builds the authenticated JSON request.
	pub fn request(&self, business_id: &BusinessId, token: &AccessToken) -> HttpRequestSpec {
		let payload = serde_json::json!({ "vendorCallKey": business_id.as_str() });

		HttpRequestSpec::post(self.endpoint.clone())
			.header("Content-Type", "application/json")
			.header("Authorization", token.authorization())
			.body(payload.to_string())
	}

	/// Sends the call and returns the transport's result untouched.
	pub async fn invoke(
		&self,
		business_id: &BusinessId,
		token: &AccessToken,
	) -> Result<JsonResponse> {
		const STAGE: Stage = Stage::Invoke;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(http::send(self.transport.as_ref(), self.request(business_id, token)))
			.await;

		obs::record_result(STAGE, &result);

		result
	}
}
impl<T> Debug for RestInvoker<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RestInvoker").field("endpoint", &self.endpoint.as_str()).finish()
	}
}
