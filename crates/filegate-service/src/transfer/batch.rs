//! Batch upload coordinator — per-item isolation over one chosen backend.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use filegate_core::config::storage::StorageConfig;
use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::storage::{ByteStream, NewDriveObject};
use filegate_entity::file::{StorageLocation, TransferItem, TransferPayload, TransferResult};
use filegate_storage::chunked::{ChunkedUploadOpts, ChunkedUploader};
use filegate_storage::keys::resolve_storage_key;

use super::BackendHandle;

/// Uploads a batch of items, isolating each item's failure.
///
/// Every submitted caller key appears exactly once in the returned
/// mapping; no guarantee is made about completion order. One item's
/// failure never cancels sibling items still pending or in flight.
#[derive(Debug, Clone)]
pub struct BatchUploadCoordinator {
    /// Immutable storage configuration for this coordinator.
    config: StorageConfig,
    /// Chunk driver for the share path.
    uploader: ChunkedUploader,
}

impl BatchUploadCoordinator {
    /// Creates a new coordinator.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            uploader: ChunkedUploader,
        }
    }

    /// Upload every item against `backend`, returning one result per
    /// caller key.
    pub async fn upload_batch(
        &self,
        items: HashMap<String, TransferItem>,
        backend: &BackendHandle,
    ) -> HashMap<String, TransferResult> {
        let max_items = self.config.transfer.max_concurrent_items.max(1);

        let results: Vec<TransferResult> = stream::iter(
            items
                .into_iter()
                .map(|(key, item)| self.upload_one(key, item, backend)),
        )
        .buffer_unordered(max_items)
        .collect()
        .await;

        results.into_iter().map(|r| (r.key.clone(), r)).collect()
    }

    /// Upload one item, converting any failure into a failure result.
    async fn upload_one(
        &self,
        key: String,
        item: TransferItem,
        backend: &BackendHandle,
    ) -> TransferResult {
        let file_name = item.file_name.clone();
        match self.try_upload(&key, item, backend).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    key,
                    file_name,
                    backend = %backend.choice(),
                    error = %err,
                    "Batch item upload failed"
                );
                TransferResult::failed(key, failure_kind(&err), err.message)
            }
        }
    }

    async fn try_upload(
        &self,
        key: &str,
        item: TransferItem,
        backend: &BackendHandle,
    ) -> AppResult<TransferResult> {
        if item.size_bytes > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        match backend {
            BackendHandle::Share(store) => {
                let storage_key = resolve_storage_key(key, item.extension());
                let opts = ChunkedUploadOpts::from(&self.config.transfer);
                let size = item.size_bytes;

                self.uploader
                    .upload(store.as_ref(), &storage_key, item.payload, size, &opts)
                    .await?;

                info!(key, storage_key, size, "Uploaded item to share backend");
                Ok(TransferResult::succeeded(
                    key,
                    StorageLocation::Key(storage_key),
                ))
            }
            BackendHandle::Drive(store) => {
                let object = NewDriveObject {
                    name: item.file_name,
                    mime_type: None,
                };
                let body: ByteStream = match item.payload {
                    TransferPayload::Buffered(data) => {
                        Box::pin(stream::once(std::future::ready(Ok(data))))
                    }
                    TransferPayload::Stream(source) => source,
                };

                let id = store.create_with_body(&object, body).await?;
                info!(key, id, "Uploaded item to drive backend");

                if !self.config.drive.make_public {
                    return Ok(TransferResult::succeeded(key, StorageLocation::External(id)));
                }

                // Best effort: the file exists either way, it just stays
                // access-restricted when the grant fails.
                match store.grant_public_read(&id).await {
                    Ok(()) => Ok(TransferResult::succeeded(key, StorageLocation::External(id))),
                    Err(err) => {
                        warn!(key, id, error = %err, "Public read grant failed");
                        Ok(TransferResult::succeeded_with_warning(
                            key,
                            StorageLocation::External(id),
                            format!("File uploaded but public access grant failed: {}", err.message),
                        ))
                    }
                }
            }
        }
    }
}

/// Classify an item failure for its result.
///
/// Kinds the transfer contract defines pass through; anything else is
/// reported as the `Exception` catch-all.
fn failure_kind(err: &AppError) -> ErrorKind {
    match err.kind {
        ErrorKind::NotFound
        | ErrorKind::BackendRejected
        | ErrorKind::PartialWrite
        | ErrorKind::Validation
        | ErrorKind::Storage => err.kind,
        _ => ErrorKind::Exception,
    }
}
