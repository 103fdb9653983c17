//! Lazily populated, never-expiring access token cache.
//!
//! The cache starts empty and moves to the cached state on the first successful
//! authentication; it never goes back. A hit performs no I/O. Misses are serialized by a
//! singleflight guard, so concurrent cold-start callers piggy-back on one credential
//! exchange instead of each authenticating. A failed exchange leaves the cache empty and
//! the next caller tries again.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Authenticate},
	obs::{self, CacheLookup},
};

/// Token held by the cache together with the instant it was stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Cached access token.
	pub token: AccessToken,
	/// When the token was stored.
	pub cached_at: OffsetDateTime,
}

/// Single-slot access token cache shared by every invocation of a bridge.
pub struct TokenCache<A>
where
	A: ?Sized + Authenticate,
{
	authenticator: Arc<A>,
	slot: Mutex<Option<CachedToken>>,
	miss_guard: AsyncMutex<()>,
}
impl<A> TokenCache<A>
where
	A: ?Sized + Authenticate,
{
	/// Creates an empty cache backed by `authenticator`.
	pub fn new(authenticator: Arc<A>) -> Self {
		Self { authenticator, slot: Mutex::new(None), miss_guard: AsyncMutex::new(()) }
	}

	/// Returns the cached token, authenticating first if the cache is empty.
	pub async fn get_token(&self) -> Result<AccessToken> {
		if let Some(token) = self.peek() {
			#[cfg(feature = "tracing")]
			tracing::debug!("access token cache hit");

			obs::record_cache_lookup(CacheLookup::Hit);

			return Ok(token);
		}

		let _singleflight = self.miss_guard.lock().await;

		// Another caller may have filled the slot while this one waited on the guard.
		if let Some(token) = self.peek() {
			obs::record_cache_lookup(CacheLookup::Coalesced);

			return Ok(token);
		}

		obs::record_cache_lookup(CacheLookup::Miss);

		#[cfg(feature = "tracing")]
		tracing::info!("access token cache miss, authenticating");

		let token = self.authenticator.authenticate().await?;

		*self.slot.lock() =
			Some(CachedToken { token: token.clone(), cached_at: OffsetDateTime::now_utc() });

		Ok(token)
	}

	/// Returns the cached token without authenticating.
	pub fn peek(&self) -> Option<AccessToken> {
		self.slot.lock().as_ref().map(|cached| cached.token.clone())
	}

	/// Returns when the current token was cached.
	pub fn cached_at(&self) -> Option<OffsetDateTime> {
		self.slot.lock().as_ref().map(|cached| cached.cached_at)
	}

	/// Whether a token is cached.
	pub fn is_cached(&self) -> bool {
		self.slot.lock().is_some()
	}

	/// Authenticator used on cache misses.
	pub fn authenticator(&self) -> &A {
		&self.authenticator
	}
}
impl<A> Debug for TokenCache<A>
where
	A: ?Sized + Authenticate,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("cached", &self.is_cached())
			.field("cached_at", &self.cached_at())
			.finish()
	}
}
