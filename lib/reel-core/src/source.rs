//! Byte sources for streaming uploads.
//!
//! A [`ByteSource`] is the "anything openable" seam of the upload pipeline:
//! in-memory buffers, local files, and live network streams all expose one
//! `read_chunk` method, so the multipart encoder never cares where payload
//! bytes come from. Sources are consumed exactly once and are closed by drop
//! on every exit path.

use std::future::Future;
use std::path::Path;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::response::streaming::StreamingBody;
use crate::{Error, Result};

/// Fixed chunk size for streamed payload reads (64 KiB).
///
/// Bounds peak memory of a streaming upload to one chunk regardless of
/// payload size.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A readable source of payload bytes.
///
/// `read_chunk` returns at most `max_bytes` bytes per call, or `Ok(None)` at
/// end-of-stream. A returned error is terminal: callers must not read again.
pub trait ByteSource: Send {
    /// Read the next chunk, up to `max_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamRead`] if the underlying source fails.
    fn read_chunk(
        &mut self,
        max_bytes: usize,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send;
}

/// Byte source over a fully-loaded in-memory payload.
#[derive(Debug, Clone)]
pub struct BufferSource {
    data: Bytes,
}

impl BufferSource {
    /// Create a source over the given bytes.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Remaining unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl ByteSource for BufferSource {
    async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let take = self.data.len().min(max_bytes);
        Ok(Some(self.data.split_to(take)))
    }
}

/// Byte source over any async reader: an open file, a socket, a pipe.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R> ReaderSource<R> {
    /// Wrap an already-open reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ReaderSource<tokio::fs::File> {
    /// Open a file at `path` for streamed reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamRead`] if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::stream_read(format!("open {}: {e}", path.display())))?;
        Ok(Self::new(file))
    }
}

impl<R: AsyncRead + Unpin + Send> ByteSource for ReaderSource<R> {
    async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
        let mut buf = vec![0u8; max_bytes];
        let read = self
            .reader
            .read(&mut buf)
            .await
            .map_err(|e| Error::stream_read(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some(Bytes::from(buf)))
    }
}

/// Byte source over a streaming HTTP response body.
///
/// Frames larger than `max_bytes` are re-chunked across reads, so a remote
/// download can feed an upload without either side buffering the payload.
pub struct StreamSource {
    stream: StreamingBody,
    pending: Bytes,
}

impl StreamSource {
    /// Wrap a streaming body.
    #[must_use]
    pub fn new(stream: StreamingBody) -> Self {
        Self {
            stream,
            pending: Bytes::new(),
        }
    }
}

impl std::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl ByteSource for StreamSource {
    async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
        while self.pending.is_empty() {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(frame)) => self.pending = frame,
                Some(Err(e)) => return Err(Error::stream_read(e.to_string())),
            }
        }
        let take = self.pending.len().min(max_bytes);
        Ok(Some(self.pending.split_to(take)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_source_respects_max_bytes() {
        let mut source = BufferSource::new(vec![7u8; 10]);

        let chunk = source.read_chunk(4).await.expect("read").expect("chunk");
        assert_eq!(chunk.len(), 4);
        assert_eq!(source.remaining(), 6);

        let chunk = source.read_chunk(100).await.expect("read").expect("chunk");
        assert_eq!(chunk.len(), 6);

        assert!(source.read_chunk(4).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn reader_source_reads_until_eof() {
        let data = vec![1u8, 2, 3, 4, 5];
        let mut source = ReaderSource::new(std::io::Cursor::new(data.clone()));

        let mut collected = Vec::new();
        while let Some(chunk) = source.read_chunk(2).await.expect("read") {
            assert!(chunk.len() <= 2);
            collected.extend_from_slice(&chunk);
        }

        assert_eq!(collected, data);
    }

    #[tokio::test]
    async fn stream_source_rechunks_large_frames() {
        let frames = vec![Ok(Bytes::from(vec![9u8; 5])), Ok(Bytes::from(vec![8u8; 1]))];
        let body: StreamingBody = Box::pin(futures_util::stream::iter(frames));
        let mut source = StreamSource::new(body);

        let chunk = source.read_chunk(3).await.expect("read").expect("chunk");
        assert_eq!(chunk.as_ref(), &[9, 9, 9]);

        let chunk = source.read_chunk(3).await.expect("read").expect("chunk");
        assert_eq!(chunk.as_ref(), &[9, 9]);

        let chunk = source.read_chunk(3).await.expect("read").expect("chunk");
        assert_eq!(chunk.as_ref(), &[8]);

        assert!(source.read_chunk(3).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn stream_source_surfaces_errors() {
        let frames: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ok")),
            Err(Error::connection("reset")),
        ];
        let body: StreamingBody = Box::pin(futures_util::stream::iter(frames));
        let mut source = StreamSource::new(body);

        assert!(source.read_chunk(16).await.expect("read").is_some());
        let err = source.read_chunk(16).await.expect_err("must fail");
        assert!(err.is_stream_read());
    }
}
