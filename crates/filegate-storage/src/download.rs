//! Download pipe — forwards a backend read stream to a caller sink.

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::storage::{ByteStream, StorageBackend};

/// Streams a stored object to a caller-supplied sink.
///
/// Bytes are pulled from the backend one chunk at a time and written
/// through before the next pull, so the sink's consumption rate gates the
/// read rate and nothing is read ahead unboundedly. When the sink closes
/// mid-stream the backend stream is dropped, which cancels the in-flight
/// read instead of draining bytes nobody will receive.
#[derive(Debug, Clone, Default)]
pub struct DownloadPipe;

impl DownloadPipe {
    /// Open a whole-object read stream for `key`.
    ///
    /// Surfaces [`ErrorKind::NotFound`] when the backend reports the
    /// object missing.
    pub async fn open(&self, backend: &dyn StorageBackend, key: &str) -> AppResult<ByteStream> {
        backend.read(key).await
    }

    /// Forward `stream` into `sink` under backpressure.
    ///
    /// Returns the number of bytes forwarded. A sink error stops the pull
    /// loop immediately and is surfaced to the caller.
    pub async fn forward<W>(&self, mut stream: ByteStream, sink: &mut W) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut forwarded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Backend read failed mid-stream", e)
            })?;
            if let Err(e) = sink.write_all(&chunk).await {
                // Caller went away; dropping `stream` cancels the backend read.
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Download sink closed after {forwarded} bytes"),
                    e,
                ));
            }
            forwarded += chunk.len() as u64;
        }

        sink.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush sink", e))?;

        tracing::debug!(bytes = forwarded, "Download forwarded");
        Ok(forwarded)
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use async_trait::async_trait;
    use bytes::Bytes;
    use filegate_core::traits::storage::ObjectPage;
    use futures::stream;

    use super::*;

    /// Backend whose read stream counts how many chunks were pulled.
    #[derive(Debug)]
    struct CountingBackend {
        chunks: Vec<Bytes>,
        pulled: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StorageBackend for CountingBackend {
        fn backend_type(&self) -> &str {
            "counting"
        }

        async fn read(&self, _key: &str) -> AppResult<ByteStream> {
            let pulled = self.pulled.clone();
            let chunks = self.chunks.clone();
            Ok(Box::pin(stream::iter(chunks).map(move |c| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(c)
            })))
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        async fn list_page(&self, _marker: Option<&str>) -> AppResult<ObjectPage> {
            Ok(ObjectPage::default())
        }
    }

    /// Sink that accepts a limited number of bytes, then errors.
    struct LimitedSink {
        accepted: Vec<u8>,
        limit: usize,
    }

    impl AsyncWrite for LimitedSink {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.accepted.len() + buf.len() > self.limit {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "sink aborted",
                )));
            }
            self.accepted.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn backend(chunks: &[&'static [u8]]) -> (CountingBackend, Arc<AtomicUsize>) {
        let pulled = Arc::new(AtomicUsize::new(0));
        (
            CountingBackend {
                chunks: chunks.iter().map(|c| Bytes::from_static(c)).collect(),
                pulled: pulled.clone(),
            },
            pulled,
        )
    }

    #[tokio::test]
    async fn forwards_whole_object() {
        let (backend, _) = backend(&[b"hello ", b"world"]);
        let pipe = DownloadPipe;
        let stream = pipe.open(&backend, "k").await.unwrap();

        let mut sink = Vec::new();
        let forwarded = pipe.forward(stream, &mut sink).await.unwrap();

        assert_eq!(forwarded, 11);
        assert_eq!(sink, b"hello world");
    }

    #[tokio::test]
    async fn sink_abort_stops_pulling_from_backend() {
        let (backend, pulled) = backend(&[b"aaaa", b"bbbb", b"cccc", b"dddd"]);
        let pipe = DownloadPipe;
        let stream = pipe.open(&backend, "k").await.unwrap();

        let mut sink = LimitedSink {
            accepted: Vec::new(),
            limit: 5,
        };
        let err = pipe.forward(stream, &mut sink).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        // The first chunk was delivered, the second hit the sink error, and
        // the remaining two were never pulled.
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
        assert_eq!(sink.accepted, b"aaaa");
    }
}
