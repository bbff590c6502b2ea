//! JWT verification against certificate keys published in a JWKS
//!
//! A call runs three stages and stops at the first failure:
//!
//! 1. **Decompose**: split on `.`, require at least two segments, decode the
//!    header (unpadded base64url), parse it as JSON, extract `kid`.
//!    Nothing is fetched if this stage fails.
//! 2. **Resolve**: ask the [`KeyResolver`] for the key published under `kid`.
//! 3. **Verify**: check the signature over the bytes as transmitted with the
//!    header's `alg`, then validate the registered claims that are present
//!    (`exp`, `nbf`, `iat`, and optionally `iss`/`aud`).
//!
//! No state is kept between calls on the verifier itself.

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, TokenData, Validation, decode, get_current_timestamp};
use serde::Deserialize;

use super::jwks::{JwksFetcher, KeyResolver};
use super::key::PublicKey;
use crate::claims::{ClaimValue, Claims};
use crate::config::VerifierConfig;
use crate::error::{FetchError, HeaderError, SignatureError, VerifyError};

const ISSUED_AT_CLAIM: &str = "iat";

/// Fields of the JWT header the verifier needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    /// Key ID (never empty)
    pub kid: String,
    /// Declared signing algorithm, as written in the header
    pub alg: Option<String>,
}

#[derive(Deserialize)]
struct RawHeader {
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    alg: Option<String>,
}

/// Decode the header segment of `token`
///
/// # Errors
///
/// - [`VerifyError::MalformedToken`] if there are fewer than two segments
/// - [`VerifyError::HeaderDecode`] if the header is not unpadded base64url
/// - [`VerifyError::HeaderParse`] if it is not a JSON object with a non-empty `kid`
pub fn decode_token_header(token: &str) -> Result<TokenHeader, VerifyError> {
    let mut segments = token.split('.');
    let header_segment = segments.next().unwrap_or_default();
    if segments.next().is_none() {
        return Err(VerifyError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(VerifyError::HeaderDecode)?;

    let raw: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| VerifyError::HeaderParse(HeaderError::Json(e)))?;

    let kid = raw
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or(VerifyError::HeaderParse(HeaderError::MissingKid))?;

    Ok(TokenHeader { kid, alg: raw.alg })
}

/// A token that passed every stage
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    /// The full claim set
    pub claims: Claims,
    /// Algorithm the token was signed with
    pub algorithm: Algorithm,
    /// Key ID from the header
    pub key_id: String,
}

/// JWT verifier backed by a [`KeyResolver`]
///
/// # Example
///
/// ```rust,no_run
/// use jwtgate_auth::jwt::JwtVerifier;
///
/// # tokio_test::block_on(async {
/// let verifier = JwtVerifier::new()?;
///
/// let token = "eyJhbGciOiJSUzI1NiIsImtpZCI6ImFiYyJ9...";
/// let verified = verifier
///     .verify(token, "https://login.example.com/discovery/keys")
///     .await?;
///
/// println!("role = {:?}", verified.claims.get("role"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct JwtVerifier<R = JwksFetcher> {
    resolver: R,
    config: VerifierConfig,
}

impl JwtVerifier<JwksFetcher> {
    /// Verifier that fetches the JWKS on every call
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_resolver(JwksFetcher::new()?))
    }
}

impl<R: KeyResolver> JwtVerifier<R> {
    /// Verifier using `resolver` for key lookup and default validation rules
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            config: VerifierConfig::default(),
        }
    }

    /// Replace the validation rules
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    /// The key resolver
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Validation rules
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `token` against the keys published at `jwks_url`
    ///
    /// `token` must not carry a `Bearer ` prefix. `jwks_url` is passed to the
    /// resolver unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] whose [`reason`](VerifyError::reason) names
    /// the stage that rejected the token.
    pub async fn verify(&self, token: &str, jwks_url: &str) -> Result<VerifiedToken, VerifyError> {
        let header = decode_token_header(token)?;
        let public_key = self.resolver.resolve(jwks_url, &header.kid).await?;
        let (claims, algorithm) = self.check_signature(token, &header, &public_key)?;

        Ok(VerifiedToken {
            claims,
            algorithm,
            key_id: header.kid,
        })
    }

    fn check_signature(
        &self,
        token: &str,
        header: &TokenHeader,
        public_key: &PublicKey,
    ) -> Result<(Claims, Algorithm), SignatureError> {
        let declared = header.alg.as_deref().unwrap_or_default();
        let algorithm = Algorithm::from_str(declared)
            .map_err(|_| SignatureError::UnsupportedAlgorithm(declared.to_string()))?;

        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(SignatureError::AlgorithmNotAllowed(algorithm));
        }
        if !public_key.supports(algorithm) {
            return Err(SignatureError::KeyTypeMismatch {
                algorithm,
                key_type: public_key.key_type(),
            });
        }

        let validation = self.validation(algorithm);
        let TokenData { claims, .. } =
            decode::<Claims>(token, &public_key.decoding_key(), &validation)?;
        self.check_issued_at(&claims, get_current_timestamp())?;

        Ok((claims, algorithm))
    }

    /// Reject tokens whose `iat` is later than `now` plus leeway
    fn check_issued_at(&self, claims: &Claims, now: u64) -> Result<(), SignatureError> {
        let Some(value) = claims.get(ISSUED_AT_CLAIM) else {
            return Ok(());
        };
        let issued_at = match value {
            ClaimValue::Number(n) => n.as_f64().ok_or(SignatureError::MalformedIssuedAt)?,
            _ => return Err(SignatureError::MalformedIssuedAt),
        };

        let latest = now.saturating_add(self.config.leeway.as_secs());
        if issued_at > latest as f64 {
            return Err(SignatureError::IssuedInFuture {
                issued_at: issued_at as u64,
            });
        }
        Ok(())
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.leeway.as_secs();
        // exp/nbf are enforced when present, never required
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;

        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}
