//! Batch transfer units and their outcomes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use filegate_core::error::ErrorKind;
use filegate_core::traits::storage::ByteStream;

/// Payload of one transfer item: either fully buffered or streamed.
pub enum TransferPayload {
    /// Payload held in memory.
    Buffered(Bytes),
    /// Payload produced incrementally. The declared size on the item must
    /// match the total bytes the stream yields or the upload fails.
    Stream(ByteStream),
}

impl std::fmt::Debug for TransferPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// One unit of a batch upload.
///
/// The batch key that maps to this item is an opaque caller-supplied name,
/// distinct from the storage key derived for the share backend. An item is
/// consumed exactly once and discarded after producing a [`TransferResult`].
#[derive(Debug)]
pub struct TransferItem {
    /// Original file name as supplied by the caller.
    pub file_name: String,
    /// Declared payload size in bytes.
    pub size_bytes: u64,
    /// The payload itself.
    pub payload: TransferPayload,
}

impl TransferItem {
    /// Build an item from an in-memory payload; the declared size is taken
    /// from the buffer length.
    pub fn buffered(file_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes: data.len() as u64,
            payload: TransferPayload::Buffered(data),
        }
    }

    /// Build an item from a streamed payload with a declared size.
    pub fn streamed(file_name: impl Into<String>, size_bytes: u64, stream: ByteStream) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
            payload: TransferPayload::Stream(stream),
        }
    }

    /// Build an item from an async reader with a declared size.
    pub fn from_reader<R>(file_name: impl Into<String>, size_bytes: u64, reader: R) -> Self
    where
        R: tokio::io::AsyncRead + Send + 'static,
    {
        let stream = tokio_util::io::ReaderStream::new(reader);
        Self::streamed(file_name, size_bytes, Box::pin(stream))
    }

    /// Extension of the original file name, without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        super::metadata::extension_of(&self.file_name)
    }
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum StorageLocation {
    /// Stored on the share backend under a key derived from the item.
    Key(String),
    /// Stored on the drive backend under a server-assigned identifier.
    External(String),
}

/// Outcome of one transfer item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum TransferOutcome {
    /// The item was uploaded.
    Succeeded {
        /// Where the bytes ended up.
        location: StorageLocation,
        /// Set when a best-effort follow-up (e.g. a public-read grant)
        /// failed without failing the upload.
        warning: Option<String>,
    },
    /// The item failed; sibling items are unaffected.
    Failed {
        /// Error classification.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

/// Result of one transfer item, tagged with its caller-supplied batch key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    /// The caller-supplied batch key of the item this result belongs to.
    pub key: String,
    /// What happened.
    pub outcome: TransferOutcome,
}

impl TransferResult {
    /// Build a success result.
    pub fn succeeded(key: impl Into<String>, location: StorageLocation) -> Self {
        Self {
            key: key.into(),
            outcome: TransferOutcome::Succeeded {
                location,
                warning: None,
            },
        }
    }

    /// Build a success result carrying a warning.
    pub fn succeeded_with_warning(
        key: impl Into<String>,
        location: StorageLocation,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            outcome: TransferOutcome::Succeeded {
                location,
                warning: Some(warning.into()),
            },
        }
    }

    /// Build a failure result.
    pub fn failed(key: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            outcome: TransferOutcome::Failed {
                kind,
                message: message.into(),
            },
        }
    }

    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Succeeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_of_file_name() {
        let item = TransferItem::buffered("report.final.pdf", Bytes::from_static(b"x"));
        assert_eq!(item.extension(), Some("pdf"));

        let item = TransferItem::buffered("README", Bytes::from_static(b"x"));
        assert_eq!(item.extension(), None);

        let item = TransferItem::buffered("trailing.", Bytes::from_static(b"x"));
        assert_eq!(item.extension(), None);
    }

    #[test]
    fn buffered_declares_size_from_buffer() {
        let item = TransferItem::buffered("a.bin", Bytes::from(vec![0u8; 42]));
        assert_eq!(item.size_bytes, 42);
    }

    #[test]
    fn result_helpers() {
        let ok = TransferResult::succeeded("f1", StorageLocation::Key("f1.pdf".into()));
        assert!(ok.is_success());

        let failed = TransferResult::failed("f2", ErrorKind::Exception, "boom");
        assert!(!failed.is_success());
    }
}
