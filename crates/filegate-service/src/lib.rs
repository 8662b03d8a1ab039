//! # filegate-service
//!
//! Service layer for FileGate: the batch upload coordinator, the transfer
//! engine façade, and the file metadata service.

pub mod file;
pub mod transfer;

pub use file::FileService;
pub use transfer::{BackendHandle, BatchUploadCoordinator, TransferEngine};
