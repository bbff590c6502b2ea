//! Host configuration
//!
//! Every option can be given as a flag or through the environment, so the
//! plugin can be deployed with nothing but environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PLUGIN_NAME` | `azure-jwt` | Name reported by `/health` and in logs |
//! | `JWKS_URL` | unset | JWKS endpoint; requests fail with 500 while unset |
//! | `JWKS_TIMEOUT_SECS` | `10` | Whole-request timeout for the JWKS download |
//! | `JWKS_CACHE_TTL_SECS` | `0` | Key cache lifetime, `0` fetches on every request |
//! | `JWT_ISSUER` | unset | Required `iss` value |
//! | `JWT_AUDIENCE` | unset | Required `aud` value |
//! | `LISTEN_ADDR` | `127.0.0.1:8080` | HTTP listen address |
//! | `LOG_LEVEL` | `info` | Filter directive, overridden by `RUST_LOG` |
//! | `LOG_JSON` | `false` | Emit JSON log lines |

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use jwtgate_auth::{CacheConfig, FetcherConfig, VerifierConfig};

use crate::logging::LoggingConfig;

/// Plugin name used when `PLUGIN_NAME` is not set
pub const DEFAULT_PLUGIN_NAME: &str = "azure-jwt";

/// jwtgate-plugin - JWT admission check for API gateways
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jwtgate-plugin",
    version,
    about = "Admit requests whose bearer token is signed by a JWKS-published certificate"
)]
pub struct PluginConfig {
    /// Plugin name
    #[arg(long, env = "PLUGIN_NAME", default_value = DEFAULT_PLUGIN_NAME)]
    pub plugin_name: String,

    /// JWKS endpoint of the identity provider
    #[arg(long, env = "JWKS_URL")]
    pub jwks_url: Option<String>,

    /// JWKS download timeout in seconds
    #[arg(long, env = "JWKS_TIMEOUT_SECS", default_value_t = 10)]
    pub jwks_timeout_secs: u64,

    /// Key cache lifetime in seconds (0 disables caching)
    #[arg(long, env = "JWKS_CACHE_TTL_SECS", default_value_t = 0)]
    pub jwks_cache_ttl_secs: u64,

    /// Required issuer
    #[arg(long, env = "JWT_ISSUER")]
    pub issuer: Option<String>,

    /// Required audience
    #[arg(long, env = "JWT_AUDIENCE")]
    pub audience: Option<String>,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: SocketAddr,

    /// Log filter directive
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit structured JSON logs
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl PluginConfig {
    /// The JWKS URL, treating an empty value as unset
    pub fn jwks_url(&self) -> Option<&str> {
        self.jwks_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// HTTP settings for the JWKS fetcher
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::default().with_timeout(Duration::from_secs(self.jwks_timeout_secs))
    }

    /// Cache settings, or `None` when caching is disabled
    pub fn cache_config(&self) -> Option<CacheConfig> {
        (self.jwks_cache_ttl_secs > 0)
            .then(|| CacheConfig::with_ttl(Duration::from_secs(self.jwks_cache_ttl_secs)))
    }

    /// Token validation rules
    pub fn verifier_config(&self) -> VerifierConfig {
        let mut config = VerifierConfig::default();
        if let Some(issuer) = &self.issuer {
            config = config.with_issuer(issuer);
        }
        if let Some(audience) = &self.audience {
            config = config.with_audience(audience);
        }
        config
    }

    /// Logging settings
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            structured: self.log_json,
        }
    }
}
