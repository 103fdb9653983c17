//! Bridge-level error types shared by the transport, authenticator, parser, and handler.

// self
use crate::{_prelude::*, event::EventError};

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Notification payload could not be turned into a call key.
	#[error(transparent)]
	Event(#[from] EventError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A non-empty response body was not valid JSON.
	#[error("Endpoint returned malformed JSON with status {status}.")]
	Parse {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Endpoint answered with a status outside of `200..=299`.
	#[error("Endpoint returned HTTP status {status}.")]
	Remote {
		/// HTTP status code of the response.
		status: u16,
		/// Parsed response body; `None` when the body was empty.
		body: Option<Value>,
	},
	/// Authentication endpoint rejected the credential exchange.
	///
	/// The reported [`status`](Error::status) is always 401; the upstream code is kept for
	/// diagnostics only.
	#[error("Authentication failed (upstream status {upstream_status}).")]
	AuthenticationFailure {
		/// Status code actually returned by the authentication endpoint.
		upstream_status: u16,
		/// Parsed error body; `None` when the body was empty.
		body: Option<Value>,
	},
	/// Authentication succeeded but the response lacks a required field.
	#[error("Authentication response is missing `{field}`.")]
	AuthContract {
		/// Name of the missing field.
		field: &'static str,
	},
}
impl Error {
	/// Status code reported for authentication failures.
	pub const AUTHENTICATION_FAILURE_STATUS: u16 = 401;

	/// Returns the HTTP status associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Parse { status, .. } | Self::Remote { status, .. } => Some(*status),
			Self::AuthenticationFailure { .. } => Some(Self::AUTHENTICATION_FAILURE_STATUS),
			_ => None,
		}
	}

	/// Returns the parsed response body carried by remote and authentication failures.
	pub fn body(&self) -> Option<&Value> {
		match self {
			Self::Remote { body, .. } | Self::AuthenticationFailure { body, .. } => body.as_ref(),
			_ => None,
		}
	}

	/// Whether re-delivering the same notification later could succeed.
	///
	/// Network failures, throttling and server-side errors are transient; malformed input,
	/// rejected credentials and client errors are not.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Remote { status, .. }
			| Self::AuthenticationFailure { upstream_status: status, .. } =>
				*status == 429 || *status >= 500,
			_ => false,
		}
	}
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint does not use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint has no host component.
	#[error("The {endpoint} endpoint has no host: {url}.")]
	MissingHost {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Request timeout of zero, which would fail every request.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
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

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request target that failed.
		url: String,
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
	pub fn network(
		url: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use std::error::Error as StdError;

	#[test]
	fn authentication_failure_reports_401() {
		let err = Error::AuthenticationFailure {
			upstream_status: 400,
			body: Some(serde_json::json!({ "error": "invalid_grant" })),
		};

		assert_eq!(err.status(), Some(401));
		assert_eq!(
			err.body().and_then(|body| body.get("error")).and_then(Value::as_str),
			Some("invalid_grant")
		);
		assert!(!err.is_transient());
	}

	#[test]
	fn remote_errors_classify_by_status() {
		let throttled = Error::Remote { status: 429, body: None };
		let unavailable = Error::Remote { status: 503, body: None };
		let forbidden = Error::Remote { status: 403, body: None };

		assert!(throttled.is_transient());
		assert!(unavailable.is_transient());
		assert!(!forbidden.is_transient());
		assert_eq!(forbidden.status(), Some(403));
	}

	#[test]
	fn unavailable_token_endpoint_is_transient() {
		let unavailable = Error::AuthenticationFailure { upstream_status: 503, body: None };
		let throttled = Error::AuthenticationFailure { upstream_status: 429, body: None };

		assert!(unavailable.is_transient());
		assert!(throttled.is_transient());
		assert_eq!(unavailable.status(), Some(401));
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error = TransportError::network("https://example.com/token", io).into();

		assert!(err.is_transient());
		assert_eq!(err.status(), None);

		let source = StdError::source(&err)
			.expect("Transport error should expose the network failure as its source.");

		assert_eq!(source.to_string(), "refused");
	}
}
