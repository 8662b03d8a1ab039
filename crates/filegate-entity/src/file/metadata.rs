//! File metadata entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// A standalone document.
    Document,
    /// An attachment tied to another entity.
    Attachment,
}

/// Broad file type derived from the extension, used by consumers to pick
/// an icon or a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FileType {
    /// Word-processor document.
    Word,
    /// PDF document.
    Pdf,
    /// Anything else.
    #[default]
    NotApplicable,
}

impl FileType {
    /// Derive the file type from an extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "doc" | "docx" => Self::Word,
            "pdf" => Self::Pdf,
            _ => Self::NotApplicable,
        }
    }
}

/// Extension of a file name, without the leading dot.
///
/// `None` when the name has no dot or nothing follows the last one.
pub fn extension_of(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Metadata record for a stored file.
///
/// Exactly one of {storage key derived from `id` + `file_extension`,
/// `external_id`} locates the file's bytes: the share backend stores under
/// the derived key, the drive backend assigns `external_id` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Identifier assigned by the metadata store on create.
    pub id: Option<Uuid>,
    /// Display name (including extension) as originally uploaded.
    pub file_name: String,
    /// Category of the file.
    pub file_category: FileCategory,
    /// Broad type derived from the extension.
    #[serde(default)]
    pub file_type: FileType,
    /// Extension without the leading dot, when the name has one.
    pub file_extension: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Identifier assigned by a drive-style backend, when one owns the bytes.
    pub external_id: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub modified_at: DateTime<Utc>,
}

impl FileMetadata {
    /// Build a new unsaved record. The file type is derived from the
    /// extension; timestamps are set to now.
    pub fn new(
        file_name: impl Into<String>,
        file_category: FileCategory,
        file_extension: Option<String>,
        size_bytes: u64,
    ) -> Self {
        let now = Utc::now();
        let file_type = file_extension
            .as_deref()
            .map(FileType::from_extension)
            .unwrap_or_default();
        Self {
            id: None,
            file_name: file_name.into(),
            file_category,
            file_type,
            file_extension,
            size_bytes,
            external_id: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Whether the bytes live on a backend that assigned its own id.
    pub fn is_external(&self) -> bool {
        self.external_id.is_some()
    }
}
