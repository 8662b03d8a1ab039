//! Storage backend traits for pluggable remote object stores.
//!
//! Two structurally different backends exist: a network file-share store
//! with an explicit create-then-write-ranges lifecycle, and a consumer
//! drive store that accepts a streamed body in a single call and assigns
//! its own object identifier. The shared read-side capabilities live on
//! [`StorageBackend`]; the two upload strategies are separate traits so
//! that neither backend is forced into the other's shape.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A byte stream type used for reading and writing object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Which backend a request is served by. Selected once at the request
/// boundary; never mixed within one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Network file-share store (ranged writes, caller-assigned keys).
    #[default]
    Share,
    /// Consumer-drive store (streamed single-call create, server-assigned ids).
    Drive,
}

impl std::fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Share => write!(f, "share"),
            Self::Drive => write!(f, "drive"),
        }
    }
}

/// One entry in a backend listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object name within the listed container.
    pub name: String,
    /// Size in bytes, when the backend reports one.
    pub size_bytes: Option<u64>,
    /// Whether the entry is a directory rather than an object.
    pub is_directory: bool,
}

/// A single page of a backend listing.
///
/// Listings are paginated via an opaque continuation marker and are
/// restartable from the beginning only, not mid-page.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Entries in this page.
    pub entries: Vec<ObjectEntry>,
    /// Marker to pass to the next `list_page` call; `None` on the last page.
    pub next_marker: Option<String>,
}

/// Capabilities common to every storage backend.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "share", "drive").
    fn backend_type(&self) -> &str;

    /// Open a whole-object read stream starting at offset 0.
    async fn read(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete the object stored under `key`.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// List one page of the backend's container.
    ///
    /// Pass `None` to start from the beginning, or the previous page's
    /// `next_marker` to continue.
    async fn list_page(&self, marker: Option<&str>) -> AppResult<ObjectPage>;
}

/// Upload capability of the file-share backend: explicit two-phase object
/// lifecycle with caller-assigned keys.
#[async_trait]
pub trait RangedStore: StorageBackend {
    /// Create an empty object of exactly `size` bytes under `key`.
    async fn create(&self, key: &str, size: u64) -> AppResult<()>;

    /// Write `data` at `offset` within a previously created object.
    async fn write_range(&self, key: &str, offset: u64, data: Bytes) -> AppResult<()>;
}

/// Metadata for an object created on a drive-style backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDriveObject {
    /// Display name for the new object.
    pub name: String,
    /// MIME type, when known.
    pub mime_type: Option<String>,
}

/// Upload capability of the consumer-drive backend: single-call creation
/// with a streamed body and a server-assigned identifier.
#[async_trait]
pub trait StreamedStore: StorageBackend {
    /// Create an object from a streamed body. Returns the identifier the
    /// backend assigned; the caller records it as the file's external id.
    async fn create_with_body(
        &self,
        object: &NewDriveObject,
        body: ByteStream,
    ) -> AppResult<String>;

    /// Grant public read access to an object. Best effort: callers treat
    /// a failure here as a warning, never as an upload failure.
    async fn grant_public_read(&self, id: &str) -> AppResult<()>;
}
