//! Credential exchange against the authentication endpoint.
//!
//! [`Authenticate`] is the seam the token cache depends on; [`PasswordAuthenticator`] is the
//! production implementation, which performs a resource-owner password grant over any
//! [`HttpTransport`](crate::http::HttpTransport).

pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::*;
pub use password::*;
pub use token::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`Authenticate::authenticate`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Anything able to obtain a fresh access token.
pub trait Authenticate
where
	Self: Send + Sync,
{
	/// Performs one credential exchange. Implementations must not cache or retry.
	fn authenticate(&self) -> AuthFuture<'_>;
}
