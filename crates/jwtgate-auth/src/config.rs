//! Configuration for the fetcher, the key cache, and the verifier

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

/// Algorithms accepted by default
///
/// Only asymmetric algorithms make sense with certificate keys; `none` and
/// HMAC are never accepted.
pub const DEFAULT_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// JWKS HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout for a JWKS download
    pub timeout: Duration,
    /// `User-Agent` sent with JWKS requests
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("jwtgate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetcherConfig {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent`
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Key cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a resolved key is served without refetching
    pub time_to_live: Duration,
    /// Maximum number of (JWKS URL, kid) entries
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            time_to_live: Duration::from_secs(600),
            max_capacity: 1024,
        }
    }
}

impl CacheConfig {
    /// Cache with the given TTL and default capacity
    pub fn with_ttl(time_to_live: Duration) -> Self {
        Self {
            time_to_live,
            ..Self::default()
        }
    }

    /// Set the maximum number of cached keys
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Signature and claim validation rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Algorithms a token header may declare
    pub allowed_algorithms: Vec<Algorithm>,
    /// Clock skew tolerated for `exp`/`nbf`
    pub leeway: Duration,
    /// Expected `iss`, if any
    pub issuer: Option<String>,
    /// Expected `aud`, if any
    pub audience: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            allowed_algorithms: DEFAULT_ALGORITHMS.to_vec(),
            leeway: Duration::from_secs(60),
            issuer: None,
            audience: None,
        }
    }
}

impl VerifierConfig {
    /// Restrict the accepted algorithms
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.allowed_algorithms = algorithms;
        self
    }

    /// Set clock skew tolerance
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Require a specific `iss`
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require a specific `aud`
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}
