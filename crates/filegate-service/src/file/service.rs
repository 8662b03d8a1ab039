//! File metadata service — registration and soft deletion.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::traits::metadata::MetadataStore;
use filegate_entity::file::{FileCategory, FileMetadata, extension_of};

/// Manages file metadata records around the transfer engine.
#[derive(Clone)]
pub struct FileService {
    /// Metadata store boundary.
    metadata: Arc<dyn MetadataStore<FileMetadata>>,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(metadata: Arc<dyn MetadataStore<FileMetadata>>) -> Self {
        Self { metadata }
    }

    /// Register a new file record ahead of its upload.
    ///
    /// The extension is taken from the file name and the broad file type
    /// is derived from it.
    pub async fn register_file(
        &self,
        file_name: &str,
        file_category: FileCategory,
        size_bytes: u64,
    ) -> AppResult<FileMetadata> {
        if file_name.is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }

        let extension = extension_of(file_name).map(str::to_string);
        let record = FileMetadata::new(file_name, file_category, extension, size_bytes);
        let created = self.metadata.create(record).await?;

        info!(
            file_id = ?created.id,
            file_name,
            size = size_bytes,
            "Registered file metadata"
        );
        Ok(created)
    }

    /// Soft-delete a file: the record is disassociated from the entity it
    /// is tied to. Neither the metadata nor the stored bytes are
    /// physically removed.
    pub async fn delete_file(&self, file_id: &Uuid) -> AppResult<()> {
        let metadata = self
            .metadata
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No file found with id '{file_id}'")))?;

        info!(
            file_id = %file_id,
            file_name = %metadata.file_name,
            "File disassociated; stored bytes retained"
        );
        Ok(())
    }
}
