//! Transport primitives shared by the credential exchange and the business call.
//!
//! [`HttpTransport`] is the bridge's only dependency on an HTTP stack: it executes one
//! fully buffered request and hands back the raw response. [`send`] layers the common
//! contract on top of any transport: JSON parsing of non-empty bodies and status
//! classification, where anything outside `200..=299` becomes [`Error::Remote`] with the
//! parsed body attached.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{Method, Request},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single buffered request.
///
/// Implementations must not retry and must resolve only once the whole response body has
/// been received. Network-level failures surface as [`TransportError`]; any HTTP status,
/// successful or not, is returned as a response.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Description of one outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequestSpec {
	/// HTTP method.
	pub method: Method,
	/// Endpoint URL; only its origin and path are sent.
	pub url: Url,
	/// Header name to value mapping, forwarded as given.
	pub headers: BTreeMap<String, String>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequestSpec {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None }
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the request body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Host the request is sent to.
	pub fn host(&self) -> Option<&str> {
		self.url.host_str()
	}

	/// Path the request is sent to.
	pub fn path(&self) -> &str {
		self.url.path()
	}

	/// URL actually requested: the endpoint without its query string or fragment.
	pub fn target(&self) -> Url {
		let mut target = self.url.clone();

		target.set_query(None);
		target.set_fragment(None);

		target
	}

	/// Converts the description into an [`HttpRequest`].
	pub fn into_request(self) -> Result<HttpRequest> {
		let target = self.target();
		let mut builder = Request::builder().method(self.method).uri(target.as_str());

		for (name, value) in &self.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		builder.body(self.body.unwrap_or_default()).map_err(|e| ConfigError::from(e).into())
	}
}

/// Successful (`2xx`) response with its body parsed as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
	/// HTTP status code.
	pub status: u16,
	/// Parsed body; `None` when the response body was empty.
	pub body: Option<Value>,
}
impl JsonResponse {
	/// Classifies a raw response.
	///
	/// Non-empty bodies must be valid JSON regardless of the status; a malformed body is an
	/// [`Error::Parse`] even when the status already signals a failure.
	pub fn from_http(response: HttpResponse) -> Result<Self> {
		let status = response.status().as_u16();
		let body = parse_body(status, response.body())?;

		if (200..=299).contains(&status) {
			Ok(Self { status, body })
		} else {
			Err(Error::Remote { status, body })
		}
	}

	/// Whether the response body was empty.
	pub fn is_empty(&self) -> bool {
		self.body.is_none()
	}

	/// Looks up a top-level field of an object body.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.body.as_ref().and_then(|body| body.get(name))
	}

	/// Consumes the response, mapping an empty body to [`Value::Null`].
	pub fn into_value(self) -> Value {
		self.body.unwrap_or(Value::Null)
	}
}

/// Sends `spec` through `transport` and classifies the response.
pub async fn send<T>(transport: &T, spec: HttpRequestSpec) -> Result<JsonResponse>
where
	T: ?Sized + HttpTransport,
{
	#[cfg(feature = "tracing")]
	tracing::debug!(method = %spec.method, url = %spec.target(), "sending request");

	let request = spec.into_request()?;
	let response = transport.execute(request).await?;

	#[cfg(feature = "tracing")]
	tracing::debug!(status = response.status().as_u16(), "received response");

	JsonResponse::from_http(response)
}

fn parse_body(status: u16, raw: &[u8]) -> Result<Option<Value>> {
	if raw.is_empty() {
		return Ok(None);
	}

	serde_json::from_slice(raw).map(Some).map_err(|source| Error::Parse { source, status })
}

/// [`HttpTransport`] backed by a shared [`ReqwestClient`].
///
/// Redirects are never followed so a redirecting endpoint is classified like any other
/// non-`2xx` status. No timeout is applied unless one is configured.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport, optionally bounding every request by `timeout`.
	pub fn new(timeout: Option<std::time::Duration>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

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
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let url = request.uri().to_string();
			let request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::network(url.as_str(), e))?;
			let response =
				client.execute(request).await.map_err(|e| TransportError::network(url.as_str(), e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body =
				response.bytes().await.map_err(|e| TransportError::network(url.as_str(), e))?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
