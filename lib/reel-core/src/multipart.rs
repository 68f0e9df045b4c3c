//! Multipart form data encoding for media uploads.
//!
//! Two encoders share one wire format. [`Form`] buffers every part in memory
//! and encodes to a single byte block; [`StreamingForm`] renders the metadata
//! fields up front and streams the binary payload from a [`ByteSource`] in
//! bounded chunks, so peak memory stays at one chunk regardless of payload
//! size.
//!
//! # Example
//!
//! ```ignore
//! use reel_core::multipart::{Form, Part};
//!
//! let form = Form::new()
//!     .part(Part::new("json", request_json))
//!     .part(Part::file("file", "movie.mov", movie_bytes).with_content_type("video/quicktime"));
//!
//! let (content_type, body) = form.into_body();
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::stream;

use crate::params::Params;
use crate::response::streaming::StreamingBody;
use crate::source::{ByteSource, CHUNK_SIZE};

/// A single part in a multipart form.
///
/// Each part is either a metadata field (name + value) or a file part with
/// filename and content type.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Create a field part with the given name and data, no content type.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a file part with filename.
    ///
    /// The content type is guessed from the filename extension, or defaults
    /// to `application/octet-stream` if unknown.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename);
        Self {
            name: name.into(),
            filename: Some(filename),
            content_type: Some(content_type),
            data: data.into(),
        }
    }

    /// Set the filename for this part.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the content type for this part.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Get the part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the filename, if set.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Get the content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Get the part data.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Guess the content type from a filename extension.
pub(crate) fn guess_content_type(filename: &str) -> String {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        // Video
        "mp4" | "m4v" => "video/mp4",
        "mov" | "qt" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        "flv" => "video/x-flv",
        "3gp" => "video/3gpp",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        // Images (thumbnails, stills)
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        // Sidecar metadata
        "json" => "application/json",
        "xml" => "application/xml",
        "srt" | "vtt" | "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Render one part header: boundary line, `Content-Disposition`, optional
/// `Content-Type`, and the blank separator line.
fn put_part_header(
    buf: &mut BytesMut,
    boundary: &str,
    name: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
) {
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"\r\n");

    buf.put_slice(b"Content-Disposition: form-data; name=\"");
    buf.put_slice(name.as_bytes());
    buf.put_slice(b"\"");
    if let Some(filename) = filename {
        buf.put_slice(b"; filename=\"");
        buf.put_slice(filename.as_bytes());
        buf.put_slice(b"\"");
    }
    buf.put_slice(b"\r\n");

    if let Some(content_type) = content_type {
        buf.put_slice(b"Content-Type: ");
        buf.put_slice(content_type.as_bytes());
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(b"\r\n");
}

fn put_closing_boundary(buf: &mut BytesMut, boundary: &str) {
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--\r\n");
}

/// A buffered multipart form containing multiple parts.
///
/// Use the builder pattern to construct a form, then convert it to a body
/// with `into_body()`.
#[derive(Debug, Clone)]
pub struct Form {
    parts: Vec<Part>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create a new empty form with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            boundary: generate_boundary(),
        }
    }

    /// Create a new form with a custom boundary.
    ///
    /// The boundary should be a unique string that doesn't appear in any
    /// part data; a colliding boundary is an accepted unhandled risk.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Create a form pre-populated with one field part per canonical query
    /// pair (list values repeat the key, nested values render as JSON).
    #[must_use]
    pub fn from_params(params: &Params) -> Self {
        let mut form = Self::new();
        for (name, value) in params.to_query_pairs() {
            form.parts.push(Part::new(name, value));
        }
        form
    }

    /// Add a part to the form.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Get the boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the parts in this form.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Get the Content-Type header value for this form.
    ///
    /// Returns `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Convert the form into a body.
    ///
    /// Returns a tuple of (content-type header value, body bytes).
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let content_type = self.content_type();
        let body = self.encode();
        (content_type, body)
    }

    /// Encode the form into bytes.
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        for part in &self.parts {
            put_part_header(
                &mut buf,
                &self.boundary,
                &part.name,
                part.filename.as_deref(),
                part.content_type.as_deref(),
            );
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }

        put_closing_boundary(&mut buf, &self.boundary);
        buf.freeze()
    }
}

/// A multipart encoder that streams its file payload.
///
/// Field parts are rendered into a single preamble chunk together with the
/// file part header; the payload is then read from a [`ByteSource`] in
/// [`CHUNK_SIZE`] chunks; the closing boundary is emitted only after the
/// source reports a clean end-of-stream. The produced stream is single-pass
/// and non-restartable, and each encoding session owns its boundary token
/// and source cursor.
#[derive(Debug)]
pub struct StreamingForm {
    fields: Vec<(String, String)>,
    file_name: String,
    filename: String,
    file_content_type: String,
    boundary: String,
}

impl StreamingForm {
    /// Create a streaming form for one file part.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        filename: impl Into<String>,
        file_content_type: impl Into<String>,
    ) -> Self {
        Self {
            fields: Vec::new(),
            file_name: file_name.into(),
            filename: filename.into(),
            file_content_type: file_content_type.into(),
            boundary: generate_boundary(),
        }
    }

    /// Override the generated boundary.
    #[must_use]
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Add a metadata field part.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add one field part per canonical query pair.
    #[must_use]
    pub fn fields_from(mut self, params: &Params) -> Self {
        self.fields.extend(params.to_query_pairs());
        self
    }

    /// Get the boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the Content-Type header value for this form.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Render the preamble: every field part plus the file part header.
    fn render_preamble(&self) -> Bytes {
        let mut buf = BytesMut::new();
        for (name, value) in &self.fields {
            put_part_header(&mut buf, &self.boundary, name, None, None);
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
        put_part_header(
            &mut buf,
            &self.boundary,
            &self.file_name,
            Some(&self.filename),
            Some(&self.file_content_type),
        );
        buf.freeze()
    }

    /// Render the trailer: payload terminator plus the closing boundary.
    fn render_trailer(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(b"\r\n");
        put_closing_boundary(&mut buf, &self.boundary);
        buf.freeze()
    }

    /// Consume the form and a byte source into a lazy chunk stream.
    ///
    /// The source is read exactly once and dropped on every exit path. A
    /// read failure surfaces as [`crate::Error::StreamRead`] and terminates
    /// the stream without the closing boundary, so a truncated body is never
    /// framed as complete.
    #[must_use]
    pub fn into_stream<S>(self, source: S) -> StreamingBody
    where
        S: ByteSource + 'static,
    {
        let preamble = self.render_preamble();
        let trailer = self.render_trailer();
        let state = EncodeState {
            stage: Stage::Preamble,
            source,
            preamble,
            trailer,
        };

        Box::pin(stream::try_unfold(state, |mut state| async move {
            loop {
                match state.stage {
                    Stage::Preamble => {
                        state.stage = Stage::Payload;
                        let chunk = std::mem::take(&mut state.preamble);
                        return Ok(Some((chunk, state)));
                    }
                    Stage::Payload => match state.source.read_chunk(CHUNK_SIZE).await? {
                        Some(chunk) => return Ok(Some((chunk, state))),
                        None => state.stage = Stage::Trailer,
                    },
                    Stage::Trailer => {
                        state.stage = Stage::Done;
                        let chunk = std::mem::take(&mut state.trailer);
                        return Ok(Some((chunk, state)));
                    }
                    Stage::Done => return Ok(None),
                }
            }
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Preamble,
    Payload,
    Trailer,
    Done,
}

struct EncodeState<S> {
    stage: Stage,
    source: S,
    preamble: Bytes,
    trailer: Bytes,
}

/// Generate a random boundary string.
fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("----ReelBoundary{timestamp:x}")
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::source::BufferSource;
    use crate::{Error, Result};

    async fn collect(mut body: StreamingBody) -> Vec<Result<Bytes>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = body.next().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[test]
    fn part_field() {
        let part = Part::new("field", "value");
        assert_eq!(part.name(), "field");
        assert_eq!(part.data().as_ref(), b"value");
        assert!(part.content_type().is_none());
        assert!(part.filename().is_none());
    }

    #[test]
    fn part_file() {
        let part = Part::file("file", "movie.mov", vec![0u8, 1, 2]);
        assert_eq!(part.name(), "file");
        assert_eq!(part.filename(), Some("movie.mov"));
        assert_eq!(part.content_type(), Some("video/quicktime"));
    }

    #[test]
    fn part_with_modifiers() {
        let part = Part::new("field", "data")
            .with_filename("clip.bin")
            .with_content_type("application/custom");
        assert_eq!(part.filename(), Some("clip.bin"));
        assert_eq!(part.content_type(), Some("application/custom"));
    }

    #[test]
    fn form_empty() {
        let form = Form::new();
        assert!(form.parts().is_empty());
        assert!(form.boundary().starts_with("----ReelBoundary"));
    }

    #[test]
    fn form_content_type() {
        let form = Form::with_boundary("test-boundary");
        assert_eq!(
            form.content_type(),
            "multipart/form-data; boundary=test-boundary"
        );
    }

    #[test]
    fn form_encode() {
        let form = Form::with_boundary("boundary123").part(Part::new("field", "value"));

        let (content_type, body) = form.into_body();

        assert_eq!(content_type, "multipart/form-data; boundary=boundary123");

        let body_str = String::from_utf8_lossy(&body);
        assert!(body_str.contains("--boundary123\r\n"));
        assert!(body_str.contains("Content-Disposition: form-data; name=\"field\"\r\n"));
        assert!(body_str.contains("value\r\n"));
        assert!(body_str.contains("--boundary123--\r\n"));
    }

    #[test]
    fn form_from_params_repeats_list_keys() {
        let params = Params::new()
            .with("any", vec!["tag:foo", "tag:bar"])
            .with("command", "search_videos");

        let form = Form::from_params(&params);

        let names: Vec<&str> = form.parts().iter().map(Part::name).collect();
        assert_eq!(names, vec!["any", "any", "command"]);
    }

    #[test]
    fn guess_content_type_media() {
        assert_eq!(guess_content_type("movie.mov"), "video/quicktime");
        assert_eq!(guess_content_type("MOVIE.MP4"), "video/mp4");
        assert_eq!(guess_content_type("sound.mp3"), "audio/mpeg");
        assert_eq!(guess_content_type("still.jpg"), "image/jpeg");
        assert_eq!(
            guess_content_type("unknown.xyz"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn streaming_form_matches_buffered_form() {
        let payload = vec![42u8; 1000];

        let buffered = Form::with_boundary("b0")
            .part(Part::new("command", "create_video"))
            .part(
                Part::file("file", "movie.mov", payload.clone())
                    .with_content_type("video/quicktime"),
            );
        let (_, expected) = buffered.into_body();

        let streaming = StreamingForm::new("file", "movie.mov", "video/quicktime")
            .with_boundary("b0")
            .field("command", "create_video");
        let chunks = collect(streaming.into_stream(BufferSource::new(payload))).await;

        let mut actual = Vec::new();
        for chunk in chunks {
            actual.extend_from_slice(&chunk.expect("chunk"));
        }
        assert_eq!(actual, expected.as_ref());
    }

    #[tokio::test]
    async fn streaming_form_bounds_chunk_size() {
        let payload = vec![7u8; CHUNK_SIZE * 10];

        let form = StreamingForm::new("file", "movie.mov", "video/quicktime");
        let chunks = collect(form.into_stream(BufferSource::new(payload))).await;

        // Preamble, ten payload chunks, trailer.
        assert_eq!(chunks.len(), 12);
        for chunk in chunks {
            assert!(chunk.expect("chunk").len() <= CHUNK_SIZE);
        }
    }

    #[tokio::test]
    async fn streaming_form_trailer_only_on_clean_end() {
        let form = StreamingForm::new("file", "movie.mov", "video/quicktime").with_boundary("b1");
        let chunks = collect(form.into_stream(BufferSource::new(vec![1u8, 2, 3]))).await;

        let last = chunks.last().expect("trailer").as_ref().expect("chunk");
        assert_eq!(last.as_ref(), b"\r\n--b1--\r\n");
    }

    struct FailingSource {
        reads_left: usize,
    }

    impl ByteSource for FailingSource {
        async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
            if self.reads_left == 0 {
                return Err(Error::stream_read("source interrupted"));
            }
            self.reads_left -= 1;
            Ok(Some(Bytes::from(vec![0u8; max_bytes.min(8)])))
        }
    }

    #[tokio::test]
    async fn streaming_form_failure_omits_trailer() {
        let form = StreamingForm::new("file", "movie.mov", "video/quicktime").with_boundary("b2");
        let chunks = collect(form.into_stream(FailingSource { reads_left: 2 })).await;

        let last = chunks.last().expect("error item");
        assert!(last.as_ref().expect_err("must fail").is_stream_read());

        // No chunk before the error carries the closing boundary.
        for chunk in chunks.iter().filter_map(|c| c.as_ref().ok()) {
            assert!(!chunk.as_ref().windows(8).any(|w| w == b"--b2--\r\n"));
        }
    }

    struct DropFlagSource {
        inner: BufferSource,
        dropped: std::sync::Arc<std::sync::atomic::AtomicBool>,
        fail: bool,
    }

    impl Drop for DropFlagSource {
        fn drop(&mut self) {
            self.dropped
                .store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl ByteSource for DropFlagSource {
        async fn read_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>> {
            if self.fail {
                return Err(Error::stream_read("source interrupted"));
            }
            self.inner.read_chunk(max_bytes).await
        }
    }

    #[tokio::test]
    async fn streaming_form_closes_source_on_failure() {
        let dropped = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let source = DropFlagSource {
            inner: BufferSource::new(vec![0u8; 16]),
            dropped: dropped.clone(),
            fail: true,
        };

        let form = StreamingForm::new("file", "movie.mov", "video/quicktime");
        let mut body = form.into_stream(source);

        // Preamble, then the failing payload read.
        assert!(body.next().await.expect("preamble").is_ok());
        let err = body.next().await.expect("error item").expect_err("fail");
        assert!(err.is_stream_read());

        // The source is dropped as soon as the stream errors, without
        // waiting for the stream itself to go away.
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
        drop(body);
    }

    #[tokio::test]
    async fn streaming_form_closes_source_on_success() {
        let dropped = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let source = DropFlagSource {
            inner: BufferSource::new(vec![0u8; 16]),
            dropped: dropped.clone(),
            fail: false,
        };

        let form = StreamingForm::new("file", "movie.mov", "video/quicktime");
        let chunks = collect(form.into_stream(source)).await;

        assert!(chunks.iter().all(Result::is_ok));
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
    }
}
