//! # jwtgate-auth - JWKS-backed bearer token verification
//!
//! Verifies JSON Web Tokens issued by an external identity provider against the
//! signing certificates the provider publishes in its JWKS, and returns the
//! token's claims.
//!
//! ## Pipeline
//!
//! 1. Split the token, decode the header, read `kid`
//! 2. Fetch the JWKS, pick the first key with that `kid`, decode `x5c[0]` as a
//!    DER X.509 certificate and take its public key
//! 3. Verify the signature with the header's `alg` and validate the claims
//!
//! Each stage fails with a distinct [`RejectionReason`]. The library returns
//! structured results only and does not log.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! let claims = jwtgate_auth::verify(
//!     "eyJhbGciOiJSUzI1NiIsImtpZCI6ImFiYyJ9.eyJzdWIiOiJ1MSJ9.c2ln",
//!     "https://login.example.com/discovery/keys",
//! )
//! .await?;
//!
//! for (name, value) in claims.project(&["sub"]) {
//!     println!("{name}: {value}");
//! }
//! # Ok::<(), jwtgate_auth::VerifyError>(())
//! # });
//! ```
//!
//! ## Key caching
//!
//! [`JwksFetcher`](jwt::JwksFetcher) downloads the JWKS on every call. To reuse
//! keys across calls wrap it in a [`CachedKeyResolver`](jwt::CachedKeyResolver):
//!
//! ```rust
//! use std::time::Duration;
//! use jwtgate_auth::{CacheConfig, jwt::{CachedKeyResolver, JwksFetcher, JwtVerifier}};
//!
//! let resolver = CachedKeyResolver::new(
//!     JwksFetcher::new()?,
//!     CacheConfig::with_ttl(Duration::from_secs(600)),
//! );
//! let verifier = JwtVerifier::with_resolver(resolver);
//! # Ok::<(), jwtgate_auth::FetchError>(())
//! ```
//!
//! ## Limitations
//!
//! Keys are taken from `x5c` certificates only. JWKs that publish bare `n`/`e`
//! or `x`/`y` components without a certificate are reported as
//! [`FetchError::EmptyCertificateChain`].

pub mod claims;
pub mod config;
pub mod error;
pub mod jwt;

#[doc(inline)]
pub use claims::{ClaimValue, Claims, SUBJECT_CLAIM};
#[doc(inline)]
pub use config::{CacheConfig, FetcherConfig, VerifierConfig};
#[doc(inline)]
pub use error::{
    CertificateError, FetchError, FetchErrorKind, HeaderError, RejectionReason, Result,
    SignatureError, VerificationStage, VerifyError,
};

/// Verify `token` against the JWKS at `jwks_url` with default settings
///
/// Builds a fresh [`JwtVerifier`](jwt::JwtVerifier) that downloads the JWKS
/// for this call only.
///
/// # Errors
///
/// Returns a [`VerifyError`] describing the first stage that rejected the token.
pub async fn verify(token: &str, jwks_url: &str) -> Result<Claims> {
    let verifier = jwt::JwtVerifier::new()?;
    Ok(verifier.verify(token, jwks_url).await?.claims)
}
