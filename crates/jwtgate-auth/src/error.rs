//! Error types for JWKS retrieval and JWT verification
//!
//! Errors follow the three stages of a verification call:
//!
//! - **Input format**: the token cannot be decomposed or its header decoded
//!   ([`VerifyError::MalformedToken`], [`VerifyError::HeaderDecode`], [`VerifyError::HeaderParse`])
//! - **Key resolution**: the JWKS could not be fetched, parsed, or did not yield a key
//!   ([`VerifyError::KeyResolution`] wrapping a [`FetchError`])
//! - **Cryptographic**: the signature or the token structure did not validate
//!   ([`VerifyError::Signature`] wrapping a [`SignatureError`])
//!
//! Every failure is terminal for the call. Callers map failures to a transport
//! status through [`VerifyError::reason`], which is uniform across all variants.

use std::fmt;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::jwt::key::KeyType;

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Coarse classification of a [`FetchError`]
///
/// The four classes are the ones a caller must be able to tell apart when a
/// key cannot be produced for a `kid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The JWKS endpoint could not be reached or the response could not be read
    Transport,
    /// The response body is not JSON or does not have the JWKS shape
    MalformedJwks,
    /// No entry in the JWKS carries the requested `kid`
    KeyNotFound,
    /// The matching entry has no usable leaf certificate
    InvalidCertificate,
}

/// Failure to turn a `kid` into a public key
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("failed to build JWKS HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The JWKS URL is not an absolute HTTP(S) URL
    #[error("invalid JWKS URL `{url}`: {reason}")]
    InvalidUrl {
        /// The URL as supplied
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network or transport failure reaching the endpoint or reading the body
    #[error("failed to fetch JWKS from {url}: {source}")]
    Transport {
        /// The JWKS URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The body could not be decoded as a JWKS document
    #[error("invalid JWKS document from {url} (HTTP {status}): {source}")]
    MalformedJwks {
        /// The JWKS URL
        url: String,
        /// HTTP status of the response that carried the body
        status: u16,
        /// JSON decoding error
        #[source]
        source: serde_json::Error,
    },

    /// No key with the requested `kid` is published
    #[error("key not found for kid `{kid}`")]
    KeyNotFound {
        /// The requested key id
        kid: String,
    },

    /// The matching key has an empty `x5c` list
    #[error("key `{kid}` has no x5c certificate")]
    EmptyCertificateChain {
        /// The requested key id
        kid: String,
    },

    /// The leaf certificate is not valid standard base64
    #[error("failed to decode certificate for key `{kid}`: {source}")]
    CertificateEncoding {
        /// The requested key id
        kid: String,
        /// Base64 decoding error
        #[source]
        source: base64::DecodeError,
    },

    /// The leaf certificate is not a usable DER X.509 certificate
    #[error("failed to parse certificate for key `{kid}`: {source}")]
    Certificate {
        /// The requested key id
        kid: String,
        /// Certificate parsing error
        #[source]
        source: CertificateError,
    },
}

impl FetchError {
    /// Classify this error
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Client(_) | Self::InvalidUrl { .. } | Self::Transport { .. } => {
                FetchErrorKind::Transport
            }
            Self::MalformedJwks { .. } => FetchErrorKind::MalformedJwks,
            Self::KeyNotFound { .. } => FetchErrorKind::KeyNotFound,
            Self::EmptyCertificateChain { .. }
            | Self::CertificateEncoding { .. }
            | Self::Certificate { .. } => FetchErrorKind::InvalidCertificate,
        }
    }
}

/// Failure to extract a public key from a DER certificate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CertificateError {
    /// DER / X.509 structure is invalid
    #[error("invalid X.509 certificate: {0}")]
    Der(String),

    /// The subject public key uses an algorithm we cannot verify with
    #[error("unsupported public key algorithm {0}")]
    UnsupportedKeyAlgorithm(String),
}

/// Failure to interpret the decoded JWT header
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HeaderError {
    /// The header is not a JSON object of the expected shape
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The header has no (or an empty) `kid`
    #[error("header has no kid")]
    MissingKid,
}

/// Cryptographic or structural rejection of a token
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// `alg` is absent or not a JWS algorithm we recognise
    #[error("unsupported signing algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    /// `alg` is recognised but not in the configured allowlist
    #[error("signing algorithm {0:?} is not allowed")]
    AlgorithmNotAllowed(Algorithm),

    /// The published key cannot verify the declared algorithm
    #[error("signing algorithm {algorithm:?} does not match {key_type} key")]
    KeyTypeMismatch {
        /// Algorithm from the token header
        algorithm: Algorithm,
        /// Type of the certificate's public key
        key_type: KeyType,
    },

    /// `iat` lies in the future beyond the allowed clock skew
    #[error("token used before issued (iat {issued_at})")]
    IssuedInFuture {
        /// The `iat` claim, in seconds since the epoch
        issued_at: u64,
    },

    /// `iat` is present but not a number
    #[error("invalid format for claim: iat")]
    MalformedIssuedAt,

    /// Signature mismatch or invalid token structure/claims
    #[error("{0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Human-readable rejection reason
///
/// Exactly one reason is attached to every rejected verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// Token has fewer than two dot-separated segments
    MalformedTokenFormat,
    /// Header segment is not unpadded base64url
    HeaderDecodeFailure,
    /// Header segment is not the expected JSON
    HeaderParseFailure,
    /// The signing key could not be resolved
    KeyResolutionFailure,
    /// Signature or structural validation failed
    SignatureVerificationFailure,
}

impl RejectionReason {
    /// Stable kebab-case name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedTokenFormat => "malformed-token-format",
            Self::HeaderDecodeFailure => "header-decode-failure",
            Self::HeaderParseFailure => "header-parse-failure",
            Self::KeyResolutionFailure => "key-resolution-failure",
            Self::SignatureVerificationFailure => "signature-verification-failure",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last stage a verification call reached before it finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStage {
    /// Nothing decoded yet
    Start,
    /// Header decoded and `kid` extracted
    HeaderDecoded,
    /// Public key resolved from the JWKS
    KeyResolved,
    /// Signature and claims checked
    SignatureChecked,
}

/// Verification failure
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VerifyError {
    /// Fewer than two dot-separated segments
    #[error("invalid JWT format")]
    MalformedToken,

    /// Header is not unpadded base64url
    #[error("failed to decode JWT header: {0}")]
    HeaderDecode(#[source] base64::DecodeError),

    /// Header is not the expected JSON
    #[error("failed to parse JWT header: {0}")]
    HeaderParse(#[source] HeaderError),

    /// The signing key could not be resolved
    #[error("failed to resolve signing key: {0}")]
    KeyResolution(#[from] FetchError),

    /// Signature or structural validation failed
    #[error("failed to verify JWT: {0}")]
    Signature(#[from] SignatureError),
}

impl VerifyError {
    /// The rejection reason for this failure
    pub fn reason(&self) -> RejectionReason {
        match self {
            Self::MalformedToken => RejectionReason::MalformedTokenFormat,
            Self::HeaderDecode(_) => RejectionReason::HeaderDecodeFailure,
            Self::HeaderParse(_) => RejectionReason::HeaderParseFailure,
            Self::KeyResolution(_) => RejectionReason::KeyResolutionFailure,
            Self::Signature(_) => RejectionReason::SignatureVerificationFailure,
        }
    }

    /// The last stage that completed before the call was rejected
    pub fn stage(&self) -> VerificationStage {
        match self {
            Self::MalformedToken | Self::HeaderDecode(_) | Self::HeaderParse(_) => {
                VerificationStage::Start
            }
            Self::KeyResolution(_) => VerificationStage::HeaderDecoded,
            Self::Signature(_) => VerificationStage::KeyResolved,
        }
    }

    /// The fetch failure, if key resolution failed
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::KeyResolution(e) => Some(e),
            _ => None,
        }
    }
}
