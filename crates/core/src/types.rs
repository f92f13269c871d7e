//! Typed parameters for the storage operations
//!
//! These map one-to-one onto the request fields the S3 Connector API accepts.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default number of keys returned by a listing when none is requested
pub const DEFAULT_MAX_KEYS: u32 = 1000;

/// Default lifetime of a presigned URL, in seconds
pub const DEFAULT_PRESIGNED_EXPIRATION: u64 = 3600;

/// Canned ACL applied to an uploaded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Only the owner can read the object
    #[default]
    Private,
    /// Anyone can read the object
    PublicRead,
    /// Anyone can read and write the object
    PublicReadWrite,
    /// Any authenticated user can read the object
    AuthenticatedRead,
}

impl Visibility {
    /// Wire name of the visibility
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PublicRead => "public-read",
            Visibility::PublicReadWrite => "public-read-write",
            Visibility::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "public-read" => Ok(Visibility::PublicRead),
            "public-read-write" => Ok(Visibility::PublicReadWrite),
            "authenticated-read" => Ok(Visibility::AuthenticatedRead),
            _ => Err(format!("Invalid visibility: {s}")),
        }
    }
}

/// Operation a presigned URL grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PresignOperation {
    /// Download the object
    #[default]
    #[serde(rename = "getObject")]
    GetObject,
    /// Upload the object
    #[serde(rename = "putObject")]
    PutObject,
}

impl PresignOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresignOperation::GetObject => "getObject",
            PresignOperation::PutObject => "putObject",
        }
    }
}

impl std::fmt::Display for PresignOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresignOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "getobject" | "get" => Ok(PresignOperation::GetObject),
            "putobject" | "put" => Ok(PresignOperation::PutObject),
            _ => Err(format!("Invalid presign operation: {s}")),
        }
    }
}

/// Where the bytes of an upload come from
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// A handle resolved through the client's [`FileStore`](crate::FileStore)
    Local(String),
    /// An in-memory buffer with an explicit file name, sent as-is
    Bytes { file_name: String, bytes: Bytes },
}

impl UploadSource {
    pub fn local(handle: impl Into<String>) -> Self {
        UploadSource::Local(handle.into())
    }

    pub fn bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        UploadSource::Bytes {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Options for an upload
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// User metadata stored alongside the object
    pub metadata: BTreeMap<String, String>,
    /// Canned ACL; falls back to the client default when `None`
    pub visibility: Option<Visibility>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Options for listing objects
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Only return keys starting with this prefix
    pub prefix: Option<String>,
    /// Maximum number of keys to return
    pub max_keys: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }
}

impl ListOptions {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = max_keys;
        self
    }
}

/// Options for generating a presigned URL
#[derive(Debug, Clone, Default)]
pub struct PresignOptions {
    /// Lifetime in seconds; falls back to the client default when `None`
    pub expires_in: Option<u64>,
    pub operation: PresignOperation,
}

/// Client-wide defaults applied when an operation leaves a value unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDefaults {
    pub visibility: Visibility,
    pub presigned_expiration: u64,
}

impl Default for OperationDefaults {
    fn default() -> Self {
        Self {
            visibility: Visibility::Private,
            presigned_expiration: DEFAULT_PRESIGNED_EXPIRATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_str() {
        assert_eq!(
            "public-read".parse::<Visibility>().unwrap(),
            Visibility::PublicRead
        );
        assert_eq!(
            "AUTHENTICATED-READ".parse::<Visibility>().unwrap(),
            Visibility::AuthenticatedRead
        );
        assert!("world".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_visibility_serde_matches_display() {
        for v in [
            Visibility::Private,
            Visibility::PublicRead,
            Visibility::PublicReadWrite,
            Visibility::AuthenticatedRead,
        ] {
            let json = serde_json::to_value(v).unwrap();
            assert_eq!(json, serde_json::Value::String(v.to_string()));
        }
    }

    #[test]
    fn test_presign_operation_names() {
        assert_eq!(PresignOperation::default().as_str(), "getObject");
        assert_eq!(
            "putObject".parse::<PresignOperation>().unwrap(),
            PresignOperation::PutObject
        );
        assert_eq!(
            "get".parse::<PresignOperation>().unwrap(),
            PresignOperation::GetObject
        );
    }

    #[test]
    fn test_list_options_default() {
        let opts = ListOptions::default();
        assert!(opts.prefix.is_none());
        assert_eq!(opts.max_keys, DEFAULT_MAX_KEYS);
    }

    #[test]
    fn test_upload_options_builder() {
        let opts = UploadOptions::new()
            .visibility(Visibility::PublicRead)
            .metadata("invoice", "INV-001");
        assert_eq!(opts.visibility, Some(Visibility::PublicRead));
        assert_eq!(opts.metadata.get("invoice").map(String::as_str), Some("INV-001"));
    }
}
