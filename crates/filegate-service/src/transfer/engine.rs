//! Transfer engine façade — the entry point the HTTP boundary calls.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::AsyncWrite;
use tracing::info;
use uuid::Uuid;

use filegate_core::config::storage::StorageConfig;
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::traits::metadata::MetadataStore;
use filegate_core::traits::storage::{BackendChoice, RangedStore, StreamedStore};
use filegate_entity::file::{FileMetadata, TransferItem, TransferResult};
use filegate_storage::download::DownloadPipe;
use filegate_storage::keys::resolve_storage_key;

use super::{BackendHandle, BatchUploadCoordinator};

/// Wires the key resolver, the chosen backend, and the upload/download
/// pipes together behind two calls: `upload` and `download`.
#[derive(Clone)]
pub struct TransferEngine {
    /// Metadata store boundary.
    metadata: Arc<dyn MetadataStore<FileMetadata>>,
    /// Share backend handle.
    share: Arc<dyn RangedStore>,
    /// Drive backend handle.
    drive: Arc<dyn StreamedStore>,
    /// Batch coordinator bound to the immutable configuration.
    coordinator: BatchUploadCoordinator,
    /// Download pipe.
    pipe: DownloadPipe,
    /// Backend used when the caller does not pick one.
    default_backend: BackendChoice,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine").finish()
    }
}

impl TransferEngine {
    /// Creates a new engine over the two configured backends.
    pub fn new(
        metadata: Arc<dyn MetadataStore<FileMetadata>>,
        share: Arc<dyn RangedStore>,
        drive: Arc<dyn StreamedStore>,
        config: StorageConfig,
    ) -> Self {
        let default_backend = config.default_backend;
        Self {
            metadata,
            share,
            drive,
            coordinator: BatchUploadCoordinator::new(config),
            pipe: DownloadPipe,
            default_backend,
        }
    }

    /// The backend used when a request does not select one.
    pub fn default_backend(&self) -> BackendChoice {
        self.default_backend
    }

    fn handle(&self, choice: BackendChoice) -> BackendHandle {
        match choice {
            BackendChoice::Share => BackendHandle::Share(self.share.clone()),
            BackendChoice::Drive => BackendHandle::Drive(self.drive.clone()),
        }
    }

    /// Upload a batch of items to the chosen backend.
    ///
    /// Returns one result per caller key; item failures are isolated and
    /// reported in the mapping, never propagated.
    pub async fn upload(
        &self,
        items: HashMap<String, TransferItem>,
        choice: BackendChoice,
    ) -> HashMap<String, TransferResult> {
        let count = items.len();
        let backend = self.handle(choice);

        info!(items = count, backend = %choice, "Starting batch upload");
        let results = self.coordinator.upload_batch(items, &backend).await;

        let failed = results.values().filter(|r| !r.is_success()).count();
        info!(
            items = count,
            failed,
            backend = %choice,
            "Batch upload finished"
        );
        results
    }

    /// Stream a stored file into `sink`.
    ///
    /// Fails with `NotFound` — before any backend call — when no metadata
    /// exists for `file_id`. Files owned by the drive backend are read by
    /// their external id; everything else is read from the share backend
    /// under the re-derived storage key.
    pub async fn download<W>(&self, file_id: &Uuid, sink: &mut W) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let metadata = self
            .metadata
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No file found with id '{file_id}'")))?;

        let (backend, key) = match &metadata.external_id {
            Some(external_id) => (self.handle(BackendChoice::Drive), external_id.clone()),
            None => (
                self.handle(BackendChoice::Share),
                resolve_storage_key(&file_id.to_string(), metadata.file_extension.as_deref()),
            ),
        };

        let stream = self.pipe.open(backend.as_storage(), &key).await?;
        let forwarded = self.pipe.forward(stream, sink).await?;

        info!(
            file_id = %file_id,
            key,
            bytes = forwarded,
            backend = %backend.choice(),
            "Download complete"
        );
        Ok(forwarded)
    }
}
