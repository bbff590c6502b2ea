//! JWKS (JSON Web Key Set) retrieval and key selection
//!
//! Only the `kid` and `x5c` members of each key are read. The leaf certificate
//! (`x5c[0]`) is decoded with the standard base64 alphabet and parsed as DER
//! X.509; its subject public key is the verification key.
//!
//! [`JwksFetcher`] downloads the document on every call. Wrap it in
//! [`CachedKeyResolver`](super::CachedKeyResolver) to reuse resolved keys.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use url::Url;

use super::key::PublicKey;
use crate::config::FetcherConfig;
use crate::error::FetchError;

/// One published signing key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key ID
    #[serde(default)]
    pub kid: String,
    /// Base64 (standard alphabet) DER certificate chain, leaf first
    #[serde(default)]
    pub x5c: Vec<String>,
}

impl Jwk {
    /// Decode the leaf certificate and extract its public key
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::EmptyCertificateChain`], [`FetchError::CertificateEncoding`],
    /// or [`FetchError::Certificate`] when no key can be extracted.
    pub fn public_key(&self) -> Result<PublicKey, FetchError> {
        let leaf = self
            .x5c
            .first()
            .ok_or_else(|| FetchError::EmptyCertificateChain {
                kid: self.kid.clone(),
            })?;

        let der = STANDARD
            .decode(leaf)
            .map_err(|source| FetchError::CertificateEncoding {
                kid: self.kid.clone(),
                source,
            })?;

        PublicKey::from_certificate_der(&der).map_err(|source| FetchError::Certificate {
            kid: self.kid.clone(),
            source,
        })
    }
}

/// A JWKS snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Keys in the order the server returned them
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// First key whose `kid` equals `kid`
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    /// Resolve `kid` to a public key within this snapshot
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::KeyNotFound`] if no key matches, or the certificate
    /// errors of [`Jwk::public_key`].
    pub fn public_key(&self, kid: &str) -> Result<PublicKey, FetchError> {
        self.find(kid)
            .ok_or_else(|| FetchError::KeyNotFound {
                kid: kid.to_string(),
            })?
            .public_key()
    }
}

/// Resolves a `kid` published at a JWKS URL to a public key
#[async_trait]
pub trait KeyResolver: Send + Sync + std::fmt::Debug {
    /// Produce the public key for `kid` from the JWKS at `jwks_url`
    async fn resolve(&self, jwks_url: &str, kid: &str) -> Result<PublicKey, FetchError>;
}

#[async_trait]
impl<T: KeyResolver + ?Sized> KeyResolver for Arc<T> {
    async fn resolve(&self, jwks_url: &str, kid: &str) -> Result<PublicKey, FetchError> {
        (**self).resolve(jwks_url, kid).await
    }
}

#[async_trait]
impl<T: KeyResolver + ?Sized> KeyResolver for Box<T> {
    async fn resolve(&self, jwks_url: &str, kid: &str) -> Result<PublicKey, FetchError> {
        (**self).resolve(jwks_url, kid).await
    }
}

/// HTTP JWKS fetcher
///
/// Every [`resolve`](KeyResolver::resolve) performs one GET, parses the body,
/// and extracts the key. Nothing is retained between calls.
///
/// # Example
///
/// ```rust,no_run
/// use jwtgate_auth::jwt::{JwksFetcher, KeyResolver};
///
/// # tokio_test::block_on(async {
/// let fetcher = JwksFetcher::new()?;
/// let key = fetcher
///     .resolve("https://login.example.com/discovery/keys", "key-id-123")
///     .await?;
/// println!("resolved a {} key", key.key_type());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct JwksFetcher {
    http_client: reqwest::Client,
    config: FetcherConfig,
}

impl JwksFetcher {
    /// Create a fetcher with default settings (10 second timeout)
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a fetcher with explicit settings
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn with_config(config: FetcherConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Use an existing HTTP client
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            config: FetcherConfig::default(),
        }
    }

    /// Fetcher settings
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Download and parse the JWKS at `jwks_url`
    ///
    /// The response status is not checked: whatever body the server returns is
    /// decoded, and a non-JWKS body surfaces as [`FetchError::MalformedJwks`]
    /// carrying the status.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `jwks_url` is not an absolute HTTP(S) URL
    /// - [`FetchError::Transport`] if the request or body read fails
    /// - [`FetchError::MalformedJwks`] if the body is not a JWKS document
    pub async fn fetch_jwks(&self, jwks_url: &str) -> Result<JwkSet, FetchError> {
        let url = parse_jwks_url(jwks_url)?;

        let transport = |source| FetchError::Transport {
            url: jwks_url.to_string(),
            source,
        };

        let response = self.http_client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;

        serde_json::from_slice(&body).map_err(|source| FetchError::MalformedJwks {
            url: jwks_url.to_string(),
            status,
            source,
        })
    }
}

#[async_trait]
impl KeyResolver for JwksFetcher {
    async fn resolve(&self, jwks_url: &str, kid: &str) -> Result<PublicKey, FetchError> {
        self.fetch_jwks(jwks_url).await?.public_key(kid)
    }
}

fn parse_jwks_url(jwks_url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: jwks_url.to_string(),
        reason,
    };

    let url = Url::parse(jwks_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}
