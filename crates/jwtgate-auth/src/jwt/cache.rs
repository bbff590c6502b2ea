//! Time-bounded key cache decorator
//!
//! [`CachedKeyResolver`] wraps any [`KeyResolver`] and remembers resolved keys
//! per (JWKS URL, `kid`) for a fixed TTL. A `kid` that is not cached (new key
//! after a provider rotation, or an expired entry) goes to the inner resolver,
//! so rotation is picked up on the first token signed with the new key.
//! Failures are never cached.

use std::fmt;

use async_trait::async_trait;
use moka::future::Cache;

use super::jwks::KeyResolver;
use super::key::PublicKey;
use crate::config::CacheConfig;
use crate::error::FetchError;

type CacheKey = (String, String);

/// Caching [`KeyResolver`] decorator
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use jwtgate_auth::CacheConfig;
/// use jwtgate_auth::jwt::{CachedKeyResolver, JwksFetcher};
///
/// let resolver = CachedKeyResolver::new(
///     JwksFetcher::new()?,
///     CacheConfig::with_ttl(Duration::from_secs(300)),
/// );
/// # Ok::<(), jwtgate_auth::FetchError>(())
/// ```
pub struct CachedKeyResolver<R> {
    inner: R,
    cache: Cache<CacheKey, PublicKey>,
    config: CacheConfig,
}

impl<R: KeyResolver> CachedKeyResolver<R> {
    /// Wrap `inner` with a cache configured by `config`
    pub fn new(inner: R, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build();

        Self {
            inner,
            cache,
            config,
        }
    }

    /// The wrapped resolver
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Cache settings
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Drop a single cached key
    pub async fn invalidate(&self, jwks_url: &str, kid: &str) {
        self.cache
            .invalidate(&(jwks_url.to_string(), kid.to_string()))
            .await;
    }

    /// Drop every cached key
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Whether a key is currently cached
    pub fn contains(&self, jwks_url: &str, kid: &str) -> bool {
        self.cache
            .contains_key(&(jwks_url.to_string(), kid.to_string()))
    }
}

#[async_trait]
impl<R: KeyResolver> KeyResolver for CachedKeyResolver<R> {
    async fn resolve(&self, jwks_url: &str, kid: &str) -> Result<PublicKey, FetchError> {
        let key = (jwks_url.to_string(), kid.to_string());
        if let Some(public_key) = self.cache.get(&key).await {
            return Ok(public_key);
        }

        let public_key = self.inner.resolve(jwks_url, kid).await?;
        self.cache.insert(key, public_key.clone()).await;
        Ok(public_key)
    }
}

impl<R: fmt::Debug> fmt::Debug for CachedKeyResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedKeyResolver")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
