//! Configuration
//!
//! [`ClientConfig`] is the validated subset the request executor needs.
//! [`ConnectorSettings`] is the full configuration surface, loaded from a TOML
//! file by [`ConfigManager`] and overridden by `S3_CONNECTOR_*` environment
//! variables before a client is built.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{DEFAULT_PRESIGNED_EXPIRATION, OperationDefaults, Visibility};

/// Minimum accepted API key length
pub const MIN_API_KEY_LEN: usize = 10;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Connection settings used by every request
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    logging_enabled: bool,
}

impl ClientConfig {
    /// Create a config with the default timeout and logging enabled
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        validate_base_url(&base_url)?;
        validate_api_key(&api_key)?;
        Ok(Self {
            base_url,
            api_key,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            logging_enabled: true,
        })
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self> {
        self.set_timeout_secs(secs)?;
        Ok(self)
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// First ten characters of the key followed by `...`
    pub fn api_key_preview(&self) -> String {
        let prefix: String = self.api_key.chars().take(MIN_API_KEY_LEN).collect();
        format!("{prefix}...")
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        self.base_url = base_url;
        Ok(())
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<()> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;
        self.api_key = api_key;
        Ok(())
    }

    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(Error::config("Timeout must be greater than zero"));
        }
        self.timeout_secs = secs;
        Ok(())
    }

    pub fn set_logging(&mut self, enabled: bool) {
        self.logging_enabled = enabled;
    }
}

// The API key never appears in debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key_preview())
            .field("timeout_secs", &self.timeout_secs)
            .field("logging_enabled", &self.logging_enabled)
            .finish()
    }
}

fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(Error::config(
            "S3 Connector API key is required. Set S3_CONNECTOR_API_KEY or pass --api-key.",
        ));
    }
    if api_key.chars().count() < MIN_API_KEY_LEN {
        return Err(Error::config(format!(
            "S3 Connector API key must be at least {MIN_API_KEY_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| Error::config(format!("Invalid base URL '{base_url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(format!(
            "Unsupported base URL scheme '{other}', expected http or https"
        ))),
    }
}

/// Retry knobs; carried for compatibility, never applied to requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub enabled: bool,
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

/// Response cache knobs; carried for compatibility, never applied to requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 300,
        }
    }
}

/// Full connector configuration as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSettings {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub enable_logging: bool,
    pub default_visibility: Visibility,
    pub default_presigned_expiration: u64,
    pub retry: RetrySettings,
    pub cache: CacheSettings,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enable_logging: true,
            default_visibility: Visibility::Private,
            default_presigned_expiration: DEFAULT_PRESIGNED_EXPIRATION,
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl ConnectorSettings {
    /// Parse settings from TOML text; missing keys take their defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `S3_CONNECTOR_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply `S3_CONNECTOR_*` overrides using a custom variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let name = format!("S3_CONNECTOR_{suffix}");
            lookup(&name).map(|v| (name, v))
        };

        if let Some((_, v)) = var("BASE_URL") {
            self.base_url = v;
        }
        if let Some((_, v)) = var("API_KEY") {
            self.api_key = Some(v);
        }
        if let Some((name, v)) = var("TIMEOUT") {
            self.timeout_secs = parse_env(&name, &v)?;
        }
        if let Some((name, v)) = var("ENABLE_LOGGING") {
            self.enable_logging = parse_env_bool(&name, &v)?;
        }
        if let Some((name, v)) = var("DEFAULT_VISIBILITY") {
            self.default_visibility = v
                .parse()
                .map_err(|e: String| Error::config(format!("{name}: {e}")))?;
        }
        if let Some((name, v)) = var("PRESIGNED_EXPIRATION") {
            self.default_presigned_expiration = parse_env(&name, &v)?;
        }
        if let Some((name, v)) = var("RETRY_ENABLED") {
            self.retry.enabled = parse_env_bool(&name, &v)?;
        }
        if let Some((name, v)) = var("MAX_RETRY_ATTEMPTS") {
            self.retry.max_attempts = parse_env(&name, &v)?;
        }
        if let Some((name, v)) = var("RETRY_DELAY") {
            self.retry.delay_ms = parse_env(&name, &v)?;
        }
        if let Some((name, v)) = var("CACHE_ENABLED") {
            self.cache.enabled = parse_env_bool(&name, &v)?;
        }
        if let Some((name, v)) = var("CACHE_TTL") {
            self.cache.ttl_secs = parse_env(&name, &v)?;
        }
        Ok(())
    }

    /// Validate and extract the connection settings
    pub fn client_config(&self) -> Result<ClientConfig> {
        let api_key = self.api_key.clone().unwrap_or_default();
        Ok(ClientConfig::new(self.base_url.clone(), api_key)?
            .with_timeout_secs(self.timeout_secs)?
            .with_logging(self.enable_logging))
    }

    pub fn operation_defaults(&self) -> OperationDefaults {
        OperationDefaults {
            visibility: self.default_visibility,
            presigned_expiration: self.default_presigned_expiration,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name}: invalid value '{value}'")))
}

fn parse_env_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::config(format!("{name}: invalid boolean '{value}'"))),
    }
}

/// Locates and reads the settings file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Config file name inside the config directory
    pub const FILE_NAME: &'static str = "config.toml";

    /// Use `$S3C_CONFIG_DIR`, falling back to the platform config directory
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os("S3C_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::config("Could not determine config directory"))?
                .join("s3c"),
        };
        Ok(Self::with_path(dir.join(Self::FILE_NAME)))
    }

    /// Use an explicit config file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings; a missing file yields the defaults
    pub fn load(&self) -> Result<ConnectorSettings> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "Config file not found, using defaults");
            return Ok(ConnectorSettings::default());
        }
        let text = std::fs::read_to_string(&self.config_path)?;
        ConnectorSettings::from_toml(&text)
    }

    /// Write settings, creating the parent directory when needed
    pub fn save(&self, settings: &ConnectorSettings) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml::to_string_pretty(settings)?)?;
        Ok(())
    }
}
