//! # filegate-storage
//!
//! Storage backend implementations and the chunked transfer primitives
//! for FileGate: storage key derivation, bounded-memory chunked uploads,
//! the download pipe, and the share/drive backends.

pub mod backends;
pub mod chunked;
pub mod download;
pub mod keys;

pub use backends::{AccessCredential, DriveBackend, ShareBackend};
pub use chunked::{ChunkedUploadOpts, ChunkedUploader};
pub use download::DownloadPipe;
pub use keys::resolve_storage_key;
