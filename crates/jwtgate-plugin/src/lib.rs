//! # jwtgate-plugin - JWT admission plugin for API gateways
//!
//! Admits a request only if its `Authorization` header carries a JWT signed by
//! a certificate the identity provider publishes in its JWKS. Claims of an
//! admitted token, except `sub`, are returned as headers to forward upstream.
//!
//! Verification itself lives in [`jwtgate_auth`]; this crate adds the gateway
//! contract ([`JwtPlugin::handle`]), an HTTP surface ([`router`]), environment
//! configuration ([`PluginConfig`]), and logging ([`LoggingConfig`]).
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use clap::Parser;
//! use jwtgate_plugin::{JwtPlugin, PluginConfig, PluginRequest};
//!
//! # tokio_test::block_on(async {
//! let config = PluginConfig::parse();
//! let plugin = JwtPlugin::from_config(&config)?;
//!
//! let response = plugin
//!     .handle(&PluginRequest::with_authorization("Bearer eyJ..."))
//!     .await;
//! println!("{} {}", response.status_code, response.body);
//! # Ok::<(), jwtgate_plugin::PluginError>(())
//! # });
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod server;

pub use config::{DEFAULT_PLUGIN_NAME, PluginConfig};
pub use error::{PluginError, Result};
pub use handler::{JwtPlugin, PluginRequest, PluginResponse, bearer_token};
pub use logging::LoggingConfig;
pub use server::{router, run, serve};
