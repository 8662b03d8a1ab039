//! Chunked upload driver for ranged-write backends.
//!
//! Drives a payload through a backend's create + write-range primitives as
//! a bounded sequence of chunks. Chunks are issued in ascending offset
//! order with up to a configured number of writes in flight; the first
//! failed write stops issuance of the remaining chunks. Memory held at any
//! moment stays within a small constant multiple of the chunk size no
//! matter how large the payload is.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt, TryStreamExt};

use filegate_core::config::storage::TransferConfig;
use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::storage::{ByteStream, RangedStore};
use filegate_entity::file::TransferPayload;

use super::plan::chunk_spans;

/// Tuning for one chunked upload, taken from immutable configuration.
#[derive(Debug, Clone)]
pub struct ChunkedUploadOpts {
    /// Maximum bytes per chunk.
    pub chunk_size_bytes: u64,
    /// Maximum chunk writes in flight at once.
    pub max_in_flight: usize,
}

impl Default for ChunkedUploadOpts {
    fn default() -> Self {
        Self {
            chunk_size_bytes: 4_000_000,
            max_in_flight: 5,
        }
    }
}

impl From<&TransferConfig> for ChunkedUploadOpts {
    fn from(config: &TransferConfig) -> Self {
        Self {
            chunk_size_bytes: config.chunk_size_bytes,
            max_in_flight: config.max_in_flight_chunk_writes,
        }
    }
}

/// Uploads one payload to a ranged-write backend as a chunk sequence.
#[derive(Debug, Clone, Default)]
pub struct ChunkedUploader;

impl ChunkedUploader {
    /// Upload `payload` under `key`, creating the remote object at its
    /// declared size and writing chunks covering `[0, total_size)`.
    ///
    /// A buffered payload whose length disagrees with `total_size` fails
    /// validation before any backend call. A chunk failure after earlier
    /// chunks succeeded surfaces [`ErrorKind::PartialWrite`]; the remote
    /// object is then unusable and is never silently retried. Writes
    /// already in flight when a failure surfaces may still land, but no
    /// new chunk is issued afterwards.
    pub async fn upload(
        &self,
        store: &dyn RangedStore,
        key: &str,
        payload: TransferPayload,
        total_size: u64,
        opts: &ChunkedUploadOpts,
    ) -> AppResult<()> {
        if opts.chunk_size_bytes == 0 {
            return Err(AppError::validation("Chunk size must be non-zero"));
        }
        let max_in_flight = opts.max_in_flight.max(1);

        if let TransferPayload::Buffered(data) = &payload {
            if data.len() as u64 != total_size {
                return Err(AppError::validation(format!(
                    "Declared size {total_size} does not match payload of {} bytes",
                    data.len()
                )));
            }
        }

        store.create(key, total_size).await?;

        let mut writes = std::pin::pin!(
            chunk_stream(payload, total_size, opts.chunk_size_bytes)
                .map(|chunk| chunk.map(|(offset, data)| store.write_range(key, offset, data)))
                .try_buffered(max_in_flight)
        );

        let mut completed: u64 = 0;
        while let Some(result) = writes.next().await {
            match result {
                Ok(()) => completed += 1,
                Err(err) => {
                    if completed == 0 {
                        return Err(err);
                    }
                    let status = err.status_code;
                    return Err(AppError::partial_write(
                        format!(
                            "Chunk write failed after {completed} completed chunks: {}",
                            err.message
                        ),
                        status,
                    ));
                }
            }
        }

        tracing::debug!(key, total_size, chunks = completed, "Chunked upload complete");
        Ok(())
    }
}

/// Turn a payload into `(offset, data)` chunks in ascending offset order.
fn chunk_stream(
    payload: TransferPayload,
    total_size: u64,
    chunk_size: u64,
) -> impl futures::Stream<Item = AppResult<(u64, Bytes)>> {
    match payload {
        TransferPayload::Buffered(data) => stream::iter(
            chunk_spans(total_size, chunk_size)
                .map(move |span| Ok((span.offset, data.slice(span.offset as usize..span.end() as usize)))),
        )
        .left_stream(),
        TransferPayload::Stream(source) => rechunk(source, total_size, chunk_size).right_stream(),
    }
}

/// Re-chunking state for streamed payloads.
struct RechunkState {
    source: ByteStream,
    pending: BytesMut,
    offset: u64,
    total: u64,
    chunk: u64,
}

/// Re-chunk an arbitrary source stream into bounded chunks.
///
/// Accumulates at most one chunk's worth plus one source read in `pending`,
/// which keeps the memory ceiling independent of the payload size. A source
/// that yields more or fewer bytes than the declared total is an error.
fn rechunk(
    source: ByteStream,
    total: u64,
    chunk: u64,
) -> impl futures::Stream<Item = AppResult<(u64, Bytes)>> {
    let state = RechunkState {
        source,
        pending: BytesMut::new(),
        offset: 0,
        total,
        chunk,
    };

    stream::try_unfold(state, |mut st| async move {
        if st.offset >= st.total {
            return Ok(None);
        }

        let want = st.chunk.min(st.total - st.offset);
        while (st.pending.len() as u64) < want {
            match st.source.next().await {
                Some(Ok(data)) => {
                    if st.offset + st.pending.len() as u64 + data.len() as u64 > st.total {
                        return Err(AppError::validation(format!(
                            "Payload exceeds declared size of {} bytes",
                            st.total
                        )));
                    }
                    st.pending.extend_from_slice(&data);
                }
                Some(Err(err)) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        "Payload stream read failed",
                        err,
                    ));
                }
                None => {
                    return Err(AppError::validation(format!(
                        "Payload ended at {} of {} declared bytes",
                        st.offset + st.pending.len() as u64,
                        st.total
                    )));
                }
            }
        }

        let data = st.pending.split_to(want as usize).freeze();
        let offset = st.offset;
        st.offset += want;
        Ok(Some(((offset, data), st)))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use filegate_core::traits::storage::{ObjectPage, StorageBackend};

    use super::*;

    /// Ranged store that records calls and can fail a configured offset.
    #[derive(Debug, Default)]
    struct RecordingStore {
        created: Mutex<Vec<(String, u64)>>,
        writes: Mutex<Vec<(u64, u64)>>,
        fail_at_offset: Option<u64>,
    }

    impl RecordingStore {
        fn failing_at(offset: u64) -> Self {
            Self {
                fail_at_offset: Some(offset),
                ..Self::default()
            }
        }

        fn written(&self) -> Vec<(u64, u64)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StorageBackend for RecordingStore {
        fn backend_type(&self) -> &str {
            "recording"
        }
        async fn read(&self, key: &str) -> AppResult<ByteStream> {
            Err(AppError::not_found(format!("File not found: {key}")))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
        async fn list_page(&self, _marker: Option<&str>) -> AppResult<ObjectPage> {
            Ok(ObjectPage::default())
        }
    }

    #[async_trait]
    impl RangedStore for RecordingStore {
        async fn create(&self, key: &str, size: u64) -> AppResult<()> {
            self.created.lock().unwrap().push((key.to_string(), size));
            Ok(())
        }

        async fn write_range(&self, _key: &str, offset: u64, data: Bytes) -> AppResult<()> {
            if self.fail_at_offset == Some(offset) {
                return Err(AppError::backend_rejected(507, "insufficient storage"));
            }
            self.writes.lock().unwrap().push((offset, data.len() as u64));
            Ok(())
        }
    }

    fn opts(chunk_size: u64, max_in_flight: usize) -> ChunkedUploadOpts {
        ChunkedUploadOpts {
            chunk_size_bytes: chunk_size,
            max_in_flight,
        }
    }

    #[tokio::test]
    async fn uploads_ten_megabytes_as_three_chunks() {
        let store = RecordingStore::default();
        let payload = TransferPayload::Buffered(Bytes::from(vec![7u8; 10_000_000]));

        ChunkedUploader
            .upload(&store, "file-1.bin", payload, 10_000_000, &opts(4_000_000, 5))
            .await
            .unwrap();

        assert_eq!(
            store.created.lock().unwrap().as_slice(),
            &[("file-1.bin".to_string(), 10_000_000)]
        );
        assert_eq!(
            store.written(),
            vec![(0, 4_000_000), (4_000_000, 4_000_000), (8_000_000, 2_000_000)]
        );
    }

    #[tokio::test]
    async fn rechunks_irregular_source_stream() {
        let store = RecordingStore::default();
        let pieces: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defgh")),
            Ok(Bytes::from_static(b"ij")),
        ];
        let source: ByteStream = Box::pin(stream::iter(pieces));
        let payload = TransferPayload::Stream(source);

        ChunkedUploader
            .upload(&store, "f", payload, 10, &opts(4, 1))
            .await
            .unwrap();

        assert_eq!(store.written(), vec![(0, 4), (4, 4), (8, 2)]);
    }

    #[tokio::test]
    async fn failed_chunk_stops_remaining_writes() {
        let store = RecordingStore::failing_at(4);
        let payload = TransferPayload::Buffered(Bytes::from(vec![0u8; 10]));

        let err = ChunkedUploader
            .upload(&store, "f", payload, 10, &opts(4, 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::PartialWrite);
        assert_eq!(err.status_code, Some(507));
        // Only the first chunk landed; the third was never issued.
        assert_eq!(store.written(), vec![(0, 4)]);
    }

    #[tokio::test]
    async fn first_chunk_failure_keeps_backend_error_kind() {
        let store = RecordingStore::failing_at(0);
        let payload = TransferPayload::Buffered(Bytes::from(vec![0u8; 10]));

        let err = ChunkedUploader
            .upload(&store, "f", payload, 10, &opts(4, 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::BackendRejected);
        assert_eq!(err.status_code, Some(507));
        assert!(store.written().is_empty());
    }

    #[tokio::test]
    async fn size_mismatch_fails_before_any_backend_call() {
        let store = RecordingStore::default();
        let payload = TransferPayload::Buffered(Bytes::from(vec![0u8; 5]));

        let err = ChunkedUploader
            .upload(&store, "f", payload, 10, &opts(4, 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(store.created.lock().unwrap().is_empty());
        assert!(store.written().is_empty());
    }

    #[tokio::test]
    async fn short_source_stream_is_an_error() {
        let store = RecordingStore::default();
        let pieces: Vec<Result<Bytes, std::io::Error>> = vec![Ok(Bytes::from_static(b"abc"))];
        let source: ByteStream = Box::pin(stream::iter(pieces));
        let payload = TransferPayload::Stream(source);

        let err = ChunkedUploader
            .upload(&store, "f", payload, 10, &opts(4, 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn oversized_source_stream_is_an_error() {
        let store = RecordingStore::default();
        let pieces: Vec<Result<Bytes, std::io::Error>> =
            vec![Ok(Bytes::from_static(b"abcd")), Ok(Bytes::from_static(b"efghij"))];
        let source: ByteStream = Box::pin(stream::iter(pieces));
        let payload = TransferPayload::Stream(source);

        let err = ChunkedUploader
            .upload(&store, "f", payload, 6, &opts(4, 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn zero_byte_payload_creates_empty_object() {
        let store = RecordingStore::default();
        let payload = TransferPayload::Buffered(Bytes::new());

        ChunkedUploader
            .upload(&store, "empty", payload, 0, &opts(4, 1))
            .await
            .unwrap();

        assert_eq!(
            store.created.lock().unwrap().as_slice(),
            &[("empty".to_string(), 0)]
        );
        assert!(store.written().is_empty());
    }
}
