//! Host error types

use std::io;
use std::net::SocketAddr;

use jwtgate_auth::FetchError;
use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Failures while starting or running the plugin host
///
/// Token rejections are not errors at this level; they become `401`
/// responses from [`JwtPlugin::handle`](crate::JwtPlugin::handle).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PluginError {
    /// The JWKS HTTP client could not be built
    #[error("failed to build JWKS client: {0}")]
    Client(#[from] FetchError),

    /// The tracing subscriber could not be installed
    #[error("failed to initialize logging: {0}")]
    Logging(#[source] io::Error),

    /// The listen address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address from the configuration
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
