//! Bounded-memory chunked uploads against ranged-write backends.

pub mod plan;
pub mod upload;

pub use plan::{ChunkSpan, chunk_spans};
pub use upload::{ChunkedUploadOpts, ChunkedUploader};
