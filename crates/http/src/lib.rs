//! s3c-http: HTTP transport for the S3 Connector client
//!
//! Provides [`ReqwestTransport`] and a convenience constructor that wires it
//! into an [`S3Connector`](s3c_core::S3Connector).

pub mod transport;

use std::sync::Arc;

use s3c_core::{ClientConfig, S3Connector, TransportError};

pub use transport::ReqwestTransport;

/// Build a connector that talks HTTP through `reqwest`
pub fn connect(config: ClientConfig) -> Result<S3Connector, TransportError> {
    let transport = ReqwestTransport::new()?;
    Ok(S3Connector::new(config, Arc::new(transport)))
}
