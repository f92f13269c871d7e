//! s3c-core: Core library for the S3 Connector client
//!
//! This crate provides the core functionality shared by every front end:
//! - Configuration loading and validation
//! - The request executor and its uniform [`Envelope`] result
//! - The [`Transport`] trait the HTTP layer implements
//! - The [`S3Connector`] operation façade
//!
//! This crate is independent of any specific HTTP client, so it can be tested
//! against a mock transport and driven by any backend.

pub mod config;
pub mod connector;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod file_store;
pub mod observer;
pub mod transport;
pub mod types;

pub use config::{
    CacheSettings, ClientConfig, ConfigManager, ConnectorSettings, MIN_API_KEY_LEN, RetrySettings,
};
pub use connector::{ConnectionReport, DownloadOutcome, S3Connector, ServiceInfo};
pub use envelope::{Envelope, RawContent};
pub use error::{Error, Result};
pub use executor::RequestExecutor;
pub use file_store::{FileStore, LocalFileStore, StoredFile};
pub use observer::{RequestEvent, RequestKind, RequestObserver, RequestOutcome, TracingObserver};
pub use transport::{
    FilePart, HttpMethod, RequestBody, Transport, TransportError, TransportRequest,
    TransportResponse,
};
pub use types::{
    ListOptions, OperationDefaults, PresignOperation, PresignOptions, UploadOptions, UploadSource,
    Visibility,
};
