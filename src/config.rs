//! Static bridge configuration.
//!
//! The bridge does not load configuration itself; hosts build a [`BridgeConfig`] directly or
//! deserialize it from whatever source they use, then hand it to
//! [`Bridge::from_config`](crate::bridge::Bridge::from_config).

// std
use std::{
	net::{Ipv4Addr, Ipv6Addr},
	time::Duration,
};
// crates.io
use url::Host;
// self
use crate::{_prelude::*, auth::Credentials, error::ConfigError};

/// Endpoints, credentials, and transport options for one bridge.
#[derive(Clone, Debug, Deserialize)]
pub struct BridgeConfig {
	/// Authentication (token) endpoint.
	pub auth_endpoint: Url,
	/// Business REST endpoint.
	pub api_endpoint: Url,
	/// Password-grant credentials.
	pub credentials: Credentials,
	/// Optional per-request timeout in milliseconds; requests never time out when unset.
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}
impl BridgeConfig {
	/// Creates a configuration without a request timeout.
	pub fn new(auth_endpoint: Url, api_endpoint: Url, credentials: Credentials) -> Self {
		Self { auth_endpoint, api_endpoint, credentials, timeout_ms: None }
	}

	/// Bounds every outbound request by `timeout`.
	///
	/// Sub-millisecond remainders round up, so any non-zero duration stays non-zero.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		let millis = timeout.as_millis() + u128::from(timeout.subsec_nanos() % 1_000_000 != 0);

		self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));

		self
	}

	/// Configured request timeout.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_ms.map(Duration::from_millis)
	}

	/// Checks that both endpoints have a host and use HTTPS, and that a configured timeout
	/// is non-zero.
	///
	/// Loopback hosts may use plain HTTP so the bridge can run against local test servers.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("authentication", &self.auth_endpoint)?;
		validate_endpoint("api", &self.api_endpoint)?;

		if self.timeout_ms == Some(0) {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let Some(host) = url.host() else {
		return Err(ConfigError::MissingHost { endpoint: name, url: url.to_string() });
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(&host) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(host: &Host<&str>) -> bool {
	match host {
		Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
		Host::Ipv4(ip) => Ipv4Addr::is_loopback(ip),
		Host::Ipv6(ip) => Ipv6Addr::is_loopback(ip),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("Test URL should parse.")
	}

	fn config(auth: &str, api: &str) -> BridgeConfig {
		BridgeConfig::new(url(auth), url(api), Credentials::new("user", "pw", "id", "secret"))
	}

	#[test]
	fn https_endpoints_are_accepted() {
		config("https://login.test/services/oauth2/token", "https://api.test/apexrest/calls")
			.validate()
			.expect("HTTPS endpoints should validate.");
	}

	#[test]
	fn plain_http_is_only_allowed_on_loopback() {
		config("http://127.0.0.1:8080/token", "http://localhost:9090/calls")
			.validate()
			.expect("Loopback HTTP endpoints should validate.");
		config("https://login.test/token", "http://[::1]:9090/calls")
			.validate()
			.expect("IPv6 loopback HTTP endpoints should validate.");

		let err = config("http://login.test/token", "https://api.test/calls")
			.validate()
			.expect_err("Remote HTTP endpoints should be rejected.");

		assert!(matches!(
			err,
			ConfigError::InsecureEndpoint { endpoint: "authentication", .. }
		));
	}

	#[test]
	fn endpoints_without_host_are_rejected() {
		let err = config("https://login.test/token", "mailto:ops@example.com")
			.validate()
			.expect_err("Host-less endpoints should be rejected.");

		assert!(matches!(err, ConfigError::MissingHost { endpoint: "api", .. }));
	}

	#[test]
	fn deserializes_with_optional_timeout() {
		let config: BridgeConfig = serde_json::from_value(serde_json::json!({
			"auth_endpoint": "https://login.test/services/oauth2/token",
			"api_endpoint": "https://api.test/services/apexrest/calls",
			"credentials": {
				"username": "user",
				"password": "pw",
				"client_id": "consumer-key",
				"client_secret": "consumer-secret",
			},
		}))
		.expect("Config should deserialize.");

		assert_eq!(config.timeout(), None);
		assert_eq!(config.credentials.client_id.as_str(), "consumer-key");

		let config: BridgeConfig = serde_json::from_value(serde_json::json!({
			"auth_endpoint": "https://login.test/token",
			"api_endpoint": "https://api.test/calls",
			"credentials": {
				"username": "u",
				"password": "p",
				"client_id": "i",
				"client_secret": "s",
			},
			"timeout_ms": 750,
		}))
		.expect("Config with a timeout should deserialize.");

		assert_eq!(config.timeout(), Some(Duration::from_millis(750)));
	}

	#[test]
	fn sub_second_timeouts_keep_their_precision() {
		let base = config("https://login.test/token", "https://api.test/calls");

		assert_eq!(
			base.clone().with_timeout(Duration::from_millis(500)).timeout(),
			Some(Duration::from_millis(500))
		);
		assert_eq!(
			base.clone().with_timeout(Duration::from_millis(2_500)).timeout(),
			Some(Duration::from_millis(2_500))
		);
		assert_eq!(
			base.clone().with_timeout(Duration::from_micros(200)).timeout(),
			Some(Duration::from_millis(1))
		);
		base.with_timeout(Duration::from_millis(500))
			.validate()
			.expect("A 500ms timeout should validate.");
	}

	#[test]
	fn zero_timeout_is_rejected() {
		let err = config("https://login.test/token", "https://api.test/calls")
			.with_timeout(Duration::ZERO)
			.validate()
			.expect_err("A zero timeout should be rejected.");

		assert!(matches!(err, ConfigError::ZeroTimeout));
	}
}
