//! JWT verification infrastructure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            JwtVerifier               │
//! │  - header decomposition (kid, alg)   │
//! │  - algorithm allowlist               │
//! │  - signature + exp/nbf/iat/iss/aud   │
//! └──────────────────┬───────────────────┘
//!                    │ KeyResolver
//!          ┌─────────┴──────────┐
//!          │ CachedKeyResolver  │  (optional, TTL per kid)
//!          └─────────┬──────────┘
//!          ┌─────────┴──────────┐
//!          │    JwksFetcher     │  HTTP GET → JwkSet → x5c[0] → PublicKey
//!          └────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `jwks` - JWKS document types, the [`KeyResolver`] seam, and the HTTP fetcher
//! - `key` - public key extraction from DER certificates
//! - `cache` - TTL cache decorator for any resolver
//! - `validator` - token decomposition and signature verification

pub mod cache;
pub mod jwks;
pub mod key;
pub mod validator;

pub use cache::CachedKeyResolver;
pub use jwks::{Jwk, JwkSet, JwksFetcher, KeyResolver};
pub use key::{KeyType, PublicKey};
pub use validator::{JwtVerifier, TokenHeader, VerifiedToken, decode_token_header};
