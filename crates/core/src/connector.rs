//! S3 Connector operations
//!
//! [`S3Connector`] maps each storage and system operation onto one executor
//! call. Download-to-file is the only operation that issues two requests.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::ClientConfig;
use crate::envelope::{Envelope, RawContent, TRANSPORT_FAILURE_STATUS};
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::file_store::{FileStore, LocalFileStore};
use crate::observer::RequestObserver;
use crate::transport::{FilePart, HttpMethod, Transport};
use crate::types::{
    DEFAULT_MAX_KEYS, ListOptions, OperationDefaults, PresignOptions, UploadOptions, UploadSource,
};

/// Service name reported by [`S3Connector::service_info`]
pub const SERVICE_NAME: &str = "S3 Connector Service";

/// Operations this client supports, as reported by [`S3Connector::service_info`]
pub const SUPPORTED_OPERATIONS: [&str; 12] = [
    "upload",
    "download",
    "delete",
    "list",
    "metadata",
    "exists",
    "copy",
    "presigned_url",
    "health",
    "config_check",
    "bucket_info",
    "cleanup_temp",
];

/// Message returned when a download was saved locally
pub const DOWNLOAD_SAVED_MESSAGE: &str = "File downloaded and saved successfully";

/// Result of [`S3Connector::download`]
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// No local path requested, or the metadata call failed (envelope unchanged)
    Metadata(Envelope),
    /// Metadata fetched and the content written to `local_path`
    Saved {
        local_path: String,
        bytes_written: u64,
        metadata: Envelope,
    },
    /// Metadata fetched but the content could not be fetched or written
    SaveFailed {
        metadata: Envelope,
        error: String,
        status_code: u16,
    },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            DownloadOutcome::Metadata(env) => env.is_success(),
            DownloadOutcome::Saved { .. } => true,
            DownloadOutcome::SaveFailed { .. } => false,
        }
    }

    /// The metadata envelope from the `s3/download` call
    pub fn metadata(&self) -> &Envelope {
        match self {
            DownloadOutcome::Metadata(env)
            | DownloadOutcome::Saved { metadata: env, .. }
            | DownloadOutcome::SaveFailed { metadata: env, .. } => env,
        }
    }
}

impl Serialize for DownloadOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DownloadOutcome::Metadata(env) => env.serialize(serializer),
            DownloadOutcome::Saved {
                local_path,
                bytes_written,
                metadata,
            } => json!({
                "success": true,
                "message": DOWNLOAD_SAVED_MESSAGE,
                "local_path": local_path,
                "bytes_written": bytes_written,
                "data": metadata.data(),
                "status_code": metadata.status_code(),
            })
            .serialize(serializer),
            DownloadOutcome::SaveFailed {
                metadata,
                error,
                status_code,
            } => json!({
                "success": false,
                "error": error,
                "status_code": status_code,
                "data": metadata.data(),
            })
            .serialize(serializer),
        }
    }
}

/// Result of [`S3Connector::test_connection`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    pub base_url: String,
    pub api_key_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Static description of a client instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub service_name: String,
    pub version: String,
    pub base_url: String,
    pub api_key_prefix: String,
    pub timeout: u64,
    pub logging_enabled: bool,
    pub supported_operations: Vec<String>,
}

/// Client for the S3 Connector API
#[derive(Clone)]
pub struct S3Connector {
    executor: RequestExecutor,
    file_store: Arc<dyn FileStore>,
    defaults: OperationDefaults,
}

impl S3Connector {
    /// Create a client; local files resolve relative to the working directory
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: RequestExecutor::new(config, transport),
            file_store: Arc::new(LocalFileStore::new(".")),
            defaults: OperationDefaults::default(),
        }
    }

    pub fn with_file_store(mut self, file_store: Arc<dyn FileStore>) -> Self {
        self.file_store = file_store;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.executor = self.executor.with_observer(observer);
        self
    }

    pub fn with_defaults(mut self, defaults: OperationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    pub fn base_url(&self) -> &str {
        self.config().base_url()
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<&mut Self> {
        self.executor.config_mut().set_base_url(base_url)?;
        Ok(self)
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<&mut Self> {
        self.executor.config_mut().set_api_key(api_key)?;
        Ok(self)
    }

    pub fn set_timeout(&mut self, secs: u64) -> Result<&mut Self> {
        self.executor.config_mut().set_timeout_secs(secs)?;
        Ok(self)
    }

    pub fn set_logging(&mut self, enabled: bool) -> &mut Self {
        self.executor.config_mut().set_logging(enabled);
        self
    }

    // ========== Storage operations ==========

    /// Upload a file under `path`
    pub async fn upload(&self, source: UploadSource, path: &str, options: UploadOptions) -> Envelope {
        let (file_name, bytes) = match source {
            UploadSource::Bytes { file_name, bytes } => (file_name, bytes),
            UploadSource::Local(handle) => match self.file_store.read(&handle).await {
                Ok(file) => (file.file_name, file.bytes),
                Err(e) => {
                    tracing::warn!(handle = %handle, error = %e, "Failed to read upload source");
                    return Envelope::transport_failure(format!(
                        "Failed to read upload source '{handle}': {e}"
                    ));
                }
            },
        };

        let mut fields = Map::new();
        fields.insert("path".to_string(), json!(path));
        let visibility = options.visibility.unwrap_or(self.defaults.visibility);
        fields.insert("visibility".to_string(), json!(visibility.as_str()));
        if !options.metadata.is_empty() {
            fields.insert("metadata".to_string(), json!(options.metadata));
        }

        self.executor
            .execute_with_files(
                HttpMethod::Post,
                "s3/upload",
                fields,
                vec![FilePart::new("file", file_name, bytes)],
            )
            .await
    }

    /// Fetch download metadata and, with `local_path`, save the content
    ///
    /// A `local_path` the file store refuses fails before any request, as a
    /// status-0 [`DownloadOutcome::Metadata`] failure.
    pub async fn download(&self, key: &str, local_path: Option<&str>) -> DownloadOutcome {
        if let Some(path) = local_path
            && let Err(e) = self.file_store.check_path(path)
        {
            tracing::warn!(local_path = %path, error = %e, "Rejected download target");
            return DownloadOutcome::Metadata(Envelope::transport_failure(format!(
                "Failed to save '{path}': {e}"
            )));
        }

        let metadata = self
            .executor
            .execute(HttpMethod::Post, "s3/download", key_param(key))
            .await;

        let Some(local_path) = local_path else {
            return DownloadOutcome::Metadata(metadata);
        };
        if !metadata.is_success() {
            return DownloadOutcome::Metadata(metadata);
        }

        let bytes = match self.executor.fetch_raw_content(key).await {
            RawContent::Fetched { bytes, .. } => bytes,
            RawContent::Failed { error, status_code } => {
                return DownloadOutcome::SaveFailed {
                    metadata,
                    error,
                    status_code,
                };
            }
        };

        match self.file_store.write(local_path, &bytes).await {
            Ok(bytes_written) => DownloadOutcome::Saved {
                local_path: local_path.to_string(),
                bytes_written,
                metadata,
            },
            Err(e) => DownloadOutcome::SaveFailed {
                metadata,
                error: format!("Failed to save '{local_path}': {e}"),
                status_code: TRANSPORT_FAILURE_STATUS,
            },
        }
    }

    /// Fetch an object's raw bytes
    pub async fn download_content(&self, key: &str) -> RawContent {
        self.executor.fetch_raw_content(key).await
    }

    pub async fn delete(&self, key: &str) -> Envelope {
        self.executor
            .execute(HttpMethod::Delete, "s3/delete", key_param(key))
            .await
    }

    pub async fn list(&self, options: ListOptions) -> Envelope {
        let mut params = Map::new();
        if let Some(prefix) = options.prefix.filter(|p| !p.is_empty()) {
            params.insert("prefix".to_string(), json!(prefix));
        }
        if options.max_keys != DEFAULT_MAX_KEYS {
            params.insert("max_keys".to_string(), json!(options.max_keys));
        }
        self.executor.execute(HttpMethod::Get, "s3/list", params).await
    }

    pub async fn metadata(&self, key: &str) -> Envelope {
        self.executor
            .execute(HttpMethod::Get, "s3/metadata", key_param(key))
            .await
    }

    pub async fn exists(&self, key: &str) -> Envelope {
        self.executor
            .execute(HttpMethod::Get, "s3/exists", key_param(key))
            .await
    }

    pub async fn copy(
        &self,
        source_key: &str,
        destination_key: &str,
        metadata: &std::collections::BTreeMap<String, String>,
    ) -> Envelope {
        let mut params = Map::new();
        params.insert("source_key".to_string(), json!(source_key));
        params.insert("destination_key".to_string(), json!(destination_key));
        if !metadata.is_empty() {
            params.insert("metadata".to_string(), json!(metadata));
        }
        self.executor.execute(HttpMethod::Post, "s3/copy", params).await
    }

    /// Ask the API for a time-limited URL to `key`
    pub async fn presigned_url(&self, key: &str, options: PresignOptions) -> Envelope {
        let mut params = key_param(key);
        let expires_in = options
            .expires_in
            .unwrap_or(self.defaults.presigned_expiration);
        params.insert("expires_in".to_string(), json!(expires_in));
        params.insert("operation".to_string(), json!(options.operation.as_str()));
        self.executor
            .execute(HttpMethod::Get, "s3/presigned-url", params)
            .await
    }

    // ========== System operations ==========

    pub async fn health(&self) -> Envelope {
        self.executor
            .execute(HttpMethod::Get, "s3/health", Map::new())
            .await
    }

    pub async fn config_check(&self) -> Envelope {
        self.executor
            .execute(HttpMethod::Get, "s3/config-check", Map::new())
            .await
    }

    pub async fn bucket_info(&self) -> Envelope {
        self.executor
            .execute(HttpMethod::Get, "s3/bucket-info", Map::new())
            .await
    }

    pub async fn cleanup_temp(&self) -> Envelope {
        self.executor
            .execute(HttpMethod::Post, "s3/cleanup-temp", Map::new())
            .await
    }

    // ========== Utilities ==========

    /// Call `health` and summarize it without exposing the API key
    pub async fn test_connection(&self) -> ConnectionReport {
        let health = self.health().await;
        let config = self.config();

        match &health {
            Envelope::Success { data, .. } => ConnectionReport {
                success: true,
                message: "Successfully connected to S3 Connector".to_string(),
                base_url: config.base_url().to_string(),
                api_key_preview: config.api_key_preview(),
                health_status: Some(
                    data.as_ref()
                        .and_then(|d| d.get("bucket_status"))
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                ),
                error: None,
            },
            Envelope::Failure { error, .. } => ConnectionReport {
                success: false,
                message: "Failed to connect to S3 Connector".to_string(),
                base_url: config.base_url().to_string(),
                api_key_preview: config.api_key_preview(),
                health_status: None,
                error: Some(error.clone()),
            },
        }
    }

    pub fn service_info(&self) -> ServiceInfo {
        let config = self.config();
        ServiceInfo {
            service_name: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            base_url: config.base_url().to_string(),
            api_key_prefix: config.api_key_preview(),
            timeout: config.timeout_secs(),
            logging_enabled: config.logging_enabled(),
            supported_operations: SUPPORTED_OPERATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether the configured key meets the minimum length
    pub fn validate_api_key(&self) -> bool {
        self.config().api_key().chars().count() >= crate::config::MIN_API_KEY_LEN
    }
}

impl std::fmt::Debug for S3Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Connector")
            .field("executor", &self.executor)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

fn key_param(key: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("key".to_string(), json!(key));
    params
}
