//! Work items, identifiers and request encoding

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// One image to submit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    /// Create a work item for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<PathBuf> for WorkItem {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Stable item identifier (UUIDv5 in the OID namespace)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Derive an identifier from the item's path string
    pub fn from_path(path: &Path) -> Self {
        Self(Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            path.to_string_lossy().as_bytes(),
        ))
    }

    /// Derive an identifier from the item's bytes
    pub fn from_content(bytes: &[u8]) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the item identifier is derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Hash of the path string; renaming a file changes its id
    #[default]
    Path,
    /// Hash of the file bytes; identical images share an id
    Content,
}

impl std::fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityMode::Path => write!(f, "path"),
            IdentityMode::Content => write!(f, "content"),
        }
    }
}

impl std::str::FromStr for IdentityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(IdentityMode::Path),
            "content" | "bytes" => Ok(IdentityMode::Content),
            _ => Err(format!("Unknown identity mode: {}", s)),
        }
    }
}

/// JSON body expected by the detection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Base64-encoded image bytes
    pub image: String,
    /// Item identifier as a hyphenated UUID string
    pub id: String,
}

/// Wire-ready request for one item
///
/// Owned by the worker that encoded it and consumed by the transport.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    /// Identifier embedded in the body
    pub id: ItemId,
    /// Serialized [`InferenceRequest`]
    pub body: Vec<u8>,
}

/// Failure to turn a work item into a payload
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The file exists but has no content
    #[error("{0} is empty")]
    Empty(PathBuf),

    /// The request body could not be serialized
    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Converts work items into request payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestEncoder {
    identity: IdentityMode,
}

impl RequestEncoder {
    /// Create an encoder using the given identity derivation
    pub fn new(identity: IdentityMode) -> Self {
        Self { identity }
    }

    /// The identity derivation in use
    pub fn identity(&self) -> IdentityMode {
        self.identity
    }

    /// Compute the identifier for an item whose bytes are already loaded
    pub fn item_id(&self, item: &WorkItem, bytes: &[u8]) -> ItemId {
        match self.identity {
            IdentityMode::Path => ItemId::from_path(item.path()),
            IdentityMode::Content => ItemId::from_content(bytes),
        }
    }

    /// Encode already-loaded bytes for `item`
    pub fn encode_bytes(
        &self,
        item: &WorkItem,
        bytes: &[u8],
    ) -> Result<RequestPayload, EncodingError> {
        if bytes.is_empty() {
            return Err(EncodingError::Empty(item.path().to_path_buf()));
        }

        let id = self.item_id(item, bytes);
        let request = InferenceRequest {
            image: general_purpose::STANDARD.encode(bytes),
            id: id.to_string(),
        };
        let body = serde_json::to_vec(&request)?;

        Ok(RequestPayload { id, body })
    }

    /// Read the item's file and encode it
    pub async fn encode(&self, item: &WorkItem) -> Result<RequestPayload, EncodingError> {
        let bytes = tokio::fs::read(item.path())
            .await
            .map_err(|source| EncodingError::Read {
                path: item.path().to_path_buf(),
                source,
            })?;
        self.encode_bytes(item, &bytes)
    }
}
