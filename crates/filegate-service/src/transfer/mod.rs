//! Batch upload coordination and the transfer engine façade.

pub mod batch;
pub mod engine;

pub use batch::BatchUploadCoordinator;
pub use engine::TransferEngine;

use std::sync::Arc;

use filegate_core::traits::storage::{BackendChoice, RangedStore, StorageBackend, StreamedStore};

/// A storage backend selected for one request.
///
/// The two variants carry structurally different upload strategies, so the
/// handle is a tagged enum rather than a single upload trait: the share
/// variant is driven by the chunked uploader, the drive variant uploads in
/// one streamed call. A handle is chosen once per request and never mixed
/// within one item.
#[derive(Debug, Clone)]
pub enum BackendHandle {
    /// File-share backend: caller-assigned keys, create + ranged writes.
    Share(Arc<dyn RangedStore>),
    /// Drive backend: server-assigned ids, single-call streamed create.
    Drive(Arc<dyn StreamedStore>),
}

impl BackendHandle {
    /// Which variant this handle is.
    pub fn choice(&self) -> BackendChoice {
        match self {
            Self::Share(_) => BackendChoice::Share,
            Self::Drive(_) => BackendChoice::Drive,
        }
    }

    /// The common capability surface of the underlying backend.
    pub fn as_storage(&self) -> &dyn StorageBackend {
        match self {
            Self::Share(store) => store.as_ref(),
            Self::Drive(store) => store.as_ref(),
        }
    }
}
