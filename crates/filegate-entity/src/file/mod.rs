//! File domain entities.

pub mod metadata;
pub mod transfer;

pub use metadata::{FileCategory, FileMetadata, FileType, extension_of};
pub use transfer::{
    StorageLocation, TransferItem, TransferOutcome, TransferPayload, TransferResult,
};
