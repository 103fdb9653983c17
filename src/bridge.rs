//! Invocation pipeline: notification → call key → access token → business call.
//!
//! [`Bridge::handle`] reports every failure to the caller so the trigger can decide between
//! retrying and dead-lettering (see [`Error::is_transient`]). [`Bridge::process`] is the
//! fire-and-forget variant: failures are logged and the invocation completes without a
//! result value.

// self
use crate::{
	_prelude::*,
	auth::Authenticate,
	cache::TokenCache,
	event::{self, NotificationEvent},
	http::{HttpTransport, JsonResponse},
	invoke::RestInvoker,
	obs::{self, Stage, StageOutcome, StageSpan},
};
#[cfg(feature = "reqwest")]
use crate::{auth::PasswordAuthenticator, config::BridgeConfig, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Bridge specialized for the crate's default reqwest transport stack.
pub type ReqwestBridge = Bridge<ReqwestTransport, PasswordAuthenticator<ReqwestTransport>>;

/// Processes storage notifications against one authentication and one business endpoint.
///
/// The token cache lives as long as the bridge (or longer, when shared through
/// [`Bridge::new`]); hosts that reuse a process across invocations should keep one bridge
/// alive so authentication happens once.
pub struct Bridge<T, A>
where
	T: ?Sized + HttpTransport,
	A: ?Sized + Authenticate,
{
	/// Access token cache consulted before every business call.
	pub cache: Arc<TokenCache<A>>,
	/// Business call sender.
	pub invoker: RestInvoker<T>,
}
impl<T, A> Bridge<T, A>
where
	T: ?Sized + HttpTransport,
	A: ?Sized + Authenticate,
{
	/// Creates a bridge from its parts.
	pub fn new(cache: Arc<TokenCache<A>>, invoker: RestInvoker<T>) -> Self {
		Self { cache, invoker }
	}

	/// Runs the pipeline for `event` and returns the business endpoint's response.
	pub async fn handle(&self, event: &NotificationEvent) -> Result<JsonResponse> {
		const STAGE: Stage = Stage::Handle;

		let span = StageSpan::new(STAGE);

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async {
				let business_id = event::extract_business_id(event)?;

				span.record_business_id(&business_id);

				let token = self.cache.get_token().await?;

				self.invoker.invoke(&business_id, &token).await
			})
			.await;

		obs::record_result(STAGE, &result);

		result
	}

	/// Decodes a raw notification payload, then runs [`handle`](Self::handle).
	pub async fn handle_json(&self, payload: &str) -> Result<JsonResponse> {
		let event = NotificationEvent::from_json(payload)?;

		self.handle(&event).await
	}

	/// Runs the pipeline and swallows failures.
	///
	/// Returns the response body (`Value::Null` for an empty body) on success and `None`
	/// after logging on failure.
	pub async fn process(&self, event: &NotificationEvent) -> Option<Value> {
		match self.handle(event).await {
			Ok(response) => {
				#[cfg(feature = "tracing")]
				tracing::info!(
					status = response.status,
					body = ?response.body,
					"invocation completed"
				);

				Some(response.into_value())
			},
			Err(e) => {
				obs::log_swallowed_failure(&e);

				None
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl Bridge<ReqwestTransport, PasswordAuthenticator<ReqwestTransport>> {
	/// Validates `config` and wires the reqwest transport, password authenticator, token
	/// cache, and invoker.
	pub fn from_config(config: BridgeConfig) -> Result<Self> {
		config.validate()?;

		let transport = Arc::new(ReqwestTransport::new(config.timeout())?);
		let authenticator = PasswordAuthenticator::new(
			transport.clone(),
			config.credentials,
			config.auth_endpoint,
		);
		let cache = Arc::new(TokenCache::new(Arc::new(authenticator)));
		let invoker = RestInvoker::new(transport, config.api_endpoint);

		Ok(Self::new(cache, invoker))
	}
}
impl<T, A> Debug for Bridge<T, A>
where
	T: ?Sized + HttpTransport,
	A: ?Sized + Authenticate,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Bridge")
			.field("cache", &self.cache)
			.field("invoker", &self.invoker)
			.finish()
	}
}
