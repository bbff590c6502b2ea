//! Gateway request handler
//!
//! A gateway hands the plugin the headers of an incoming request and gets back
//! a status, a body, and headers to forward upstream:
//!
//! | Condition | Status | Body |
//! |-----------|--------|------|
//! | No `Authorization` header | 400 | `Missing Authorization header` |
//! | No JWKS URL configured | 500 | `Environment variable JWKS_URL is not set` |
//! | Token rejected | 401 | `Invalid token: <error>` |
//! | Token accepted | 200 | `JWT is valid` |
//!
//! On success every claim except `sub` is forwarded as a header.

use std::collections::BTreeMap;
use std::sync::Arc;

use jwtgate_auth::SUBJECT_CLAIM;
use jwtgate_auth::jwt::{CachedKeyResolver, JwksFetcher, JwtVerifier, KeyResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::PluginConfig;
use crate::error::Result;

const AUTHORIZATION: &str = "authorization";
const BEARER_SCHEME: &str = "bearer";

/// Headers of the request being admitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRequest {
    /// Request headers, one value per name
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl PluginRequest {
    /// Request with a single `Authorization` header
    pub fn with_authorization(value: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), value.into());
        Self { headers }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Admission decision returned to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginResponse {
    /// HTTP status for the gateway to apply
    pub status_code: u16,
    /// Response body
    pub body: String,
    /// Headers to forward upstream
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl PluginResponse {
    fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Whether the request was admitted
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Token part of an `Authorization` value
///
/// The `Bearer` scheme is matched case-insensitively and removed when present.
/// Any other value is returned unchanged.
pub fn bearer_token(value: &str) -> &str {
    let value = value.trim();
    let Some(scheme) = value.get(..BEARER_SCHEME.len()) else {
        return value;
    };
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return value;
    }

    let rest = &value[BEARER_SCHEME.len()..];
    match rest.chars().next() {
        None => "",
        Some(c) if c.is_ascii_whitespace() => rest.trim_start(),
        // `Bearerabc` is not the Bearer scheme
        Some(_) => value,
    }
}

/// JWT admission plugin
#[derive(Debug, Clone)]
pub struct JwtPlugin {
    name: String,
    jwks_url: Option<String>,
    verifier: JwtVerifier<Arc<dyn KeyResolver>>,
}

impl JwtPlugin {
    /// Plugin using `verifier` against `jwks_url`
    pub fn new(
        name: impl Into<String>,
        jwks_url: Option<String>,
        verifier: JwtVerifier<Arc<dyn KeyResolver>>,
    ) -> Self {
        Self {
            name: name.into(),
            jwks_url,
            verifier,
        }
    }

    /// Build the plugin from host configuration
    ///
    /// Wraps the fetcher in a key cache when a cache TTL is configured.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Client`](crate::PluginError::Client) if the HTTP
    /// client cannot be built.
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let fetcher = JwksFetcher::with_config(config.fetcher_config())?;
        let resolver: Arc<dyn KeyResolver> = match config.cache_config() {
            Some(cache) => Arc::new(CachedKeyResolver::new(fetcher, cache)),
            None => Arc::new(fetcher),
        };

        if config.jwks_url().is_none() {
            warn!("JWKS_URL is not set; every request will be refused");
        }

        let verifier = JwtVerifier::with_resolver(resolver).with_config(config.verifier_config());
        Ok(Self::new(
            config.plugin_name.clone(),
            config.jwks_url().map(str::to_string),
            verifier,
        ))
    }

    /// Plugin name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured JWKS URL
    pub fn jwks_url(&self) -> Option<&str> {
        self.jwks_url.as_deref()
    }

    /// Decide whether to admit `request`
    pub async fn handle(&self, request: &PluginRequest) -> PluginResponse {
        let Some(authorization) = request
            .header(AUTHORIZATION)
            .filter(|value| !value.trim().is_empty())
        else {
            debug!(plugin = %self.name, "request without Authorization header");
            return PluginResponse::new(400, "Missing Authorization header");
        };

        let Some(jwks_url) = self.jwks_url.as_deref() else {
            error!(plugin = %self.name, "JWKS_URL is not set");
            return PluginResponse::new(500, "Environment variable JWKS_URL is not set");
        };

        match self.verifier.verify(bearer_token(authorization), jwks_url).await {
            Ok(verified) => {
                info!(
                    plugin = %self.name,
                    kid = %verified.key_id,
                    alg = ?verified.algorithm,
                    subject = verified.claims.subject().unwrap_or_default(),
                    "token accepted"
                );
                let mut response = PluginResponse::new(200, "JWT is valid");
                response.headers = verified.claims.project(&[SUBJECT_CLAIM]);
                response
            }
            Err(e) => {
                warn!(
                    plugin = %self.name,
                    reason = %e.reason(),
                    error = %e,
                    "token rejected"
                );
                PluginResponse::new(401, format!("Invalid token: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plugin(jwks_url: Option<&str>) -> JwtPlugin {
        let resolver: Arc<dyn KeyResolver> = Arc::new(JwksFetcher::new().unwrap());
        JwtPlugin::new(
            "azure-jwt",
            jwks_url.map(str::to_string),
            JwtVerifier::with_resolver(resolver),
        )
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("bearer abc.def"), "abc.def");
        assert_eq!(bearer_token("BEARER   abc.def"), "abc.def");
        assert_eq!(bearer_token("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), "Basic dXNlcjpwdw==");
        assert_eq!(bearer_token("short"), "short");
        // Multi-byte input must not split a character
        assert_eq!(bearer_token("Béarer x"), "Béarer x");
    }

    #[test]
    fn test_bearer_scheme_without_token() {
        assert_eq!(bearer_token("Bearer "), "");
        assert_eq!(bearer_token("Bearer"), "");
        assert_eq!(bearer_token("  bearer \t "), "");
    }

    #[test]
    fn test_bearer_scheme_with_other_whitespace() {
        assert_eq!(bearer_token("Bearer\tabc.def"), "abc.def");
        assert_eq!(bearer_token("Bearer\t  abc.def "), "abc.def");
        assert_eq!(bearer_token("Bearerabc.def"), "Bearerabc.def");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut request = PluginRequest::default();
        request
            .headers
            .insert("AUTHORIZATION".to_string(), "Bearer t".to_string());
        assert_eq!(request.header("authorization"), Some("Bearer t"));
        assert_eq!(request.header("x-missing"), None);
    }

    #[tokio::test]
    async fn test_missing_authorization() {
        let response = plugin(Some("http://127.0.0.1:1/keys"))
            .handle(&PluginRequest::default())
            .await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "Missing Authorization header");
        assert!(response.headers.is_empty());

        let response = plugin(Some("http://127.0.0.1:1/keys"))
            .handle(&PluginRequest::with_authorization("   "))
            .await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_missing_jwks_url() {
        let response = plugin(None)
            .handle(&PluginRequest::with_authorization("Bearer a.b.c"))
            .await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Environment variable JWKS_URL is not set");
    }

    #[tokio::test]
    async fn test_malformed_token_is_unauthorized() {
        let response = plugin(Some("http://127.0.0.1:1/keys"))
            .handle(&PluginRequest::with_authorization("Bearer not-a-jwt"))
            .await;
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body, "Invalid token: invalid JWT format");
        assert!(!response.is_success());
    }
}
