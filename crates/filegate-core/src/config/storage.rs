//! Storage backend and transfer configuration.
//!
//! Configuration is an immutable value: it is loaded once, cloned into the
//! components that need it, and passed explicitly into each call. Request-time
//! options never merge back into a stored configuration object.

use serde::{Deserialize, Serialize};

use crate::traits::storage::BackendChoice;

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend used when the caller does not select one explicitly.
    #[serde(default)]
    pub default_backend: BackendChoice,
    /// Maximum upload size in bytes (default 5 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Chunked transfer tuning.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// File-share backend configuration.
    #[serde(default)]
    pub share: ShareBackendConfig,
    /// Consumer-drive backend configuration.
    #[serde(default)]
    pub drive: DriveBackendConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_backend: BackendChoice::default(),
            max_upload_size_bytes: default_max_upload(),
            transfer: TransferConfig::default(),
            share: ShareBackendConfig::default(),
            drive: DriveBackendConfig::default(),
        }
    }
}

/// Tuning knobs for chunked transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Chunk size in bytes for ranged uploads (default 4 MB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Maximum number of chunk writes in flight for one item (default 5).
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight_chunk_writes: usize,
    /// Maximum number of batch items uploaded concurrently (default 4).
    #[serde(default = "default_max_items")]
    pub max_concurrent_items: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            max_in_flight_chunk_writes: default_max_in_flight(),
            max_concurrent_items: default_max_items(),
        }
    }
}

/// Network file-share backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShareBackendConfig {
    /// Base URL of the file-share service.
    #[serde(default)]
    pub service_url: String,
    /// Name of the share to write into.
    #[serde(default)]
    pub share_name: String,
    /// Directory within the share.
    #[serde(default)]
    pub directory_name: String,
}

/// Consumer-drive backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveBackendConfig {
    /// Base URL for metadata and content reads.
    #[serde(default = "default_drive_api_url")]
    pub api_base_url: String,
    /// Base URL for uploads (drive APIs serve uploads from a separate host).
    #[serde(default = "default_drive_upload_url")]
    pub upload_base_url: String,
    /// Folder that newly created files are placed under.
    #[serde(default)]
    pub folder_id: String,
    /// Whether to grant public read access after each upload (best effort).
    #[serde(default = "default_true")]
    pub make_public: bool,
}

impl Default for DriveBackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_drive_api_url(),
            upload_base_url: default_drive_upload_url(),
            folder_id: String::new(),
            make_public: true,
        }
    }
}

fn default_max_upload() -> u64 {
    5_368_709_120 // 5 GB
}

fn default_chunk_size() -> u64 {
    4_000_000
}

fn default_max_in_flight() -> usize {
    5
}

fn default_max_items() -> usize {
    4
}

fn default_drive_api_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_drive_upload_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_true() -> bool {
    true
}
