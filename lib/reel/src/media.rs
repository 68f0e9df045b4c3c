//! High-level media API client.
//!
//! [`MediaClient`] ties the pieces together: parameters are normalized into
//! the canonical query, read commands go to the read endpoint as URL query
//! pairs, write commands go to the write endpoint as a form body, and the
//! three upload modes hand a multipart body to the transport - buffered,
//! streamed from a file path, or streamed from any [`ByteSource`].
//!
//! # Example
//!
//! ```ignore
//! use reel::{MediaClient, Params};
//!
//! let client = MediaClient::new("mytoken")?;
//!
//! let found = client
//!     .get("search_videos", Params::new().with("any", vec!["tag:foo", "tag:bar"]))
//!     .await?;
//!
//! let created = client
//!     .post_file_streaming(
//!         "create_video",
//!         "movie.mov",
//!         "video/quicktime",
//!         Params::new().with("video", Params::new().with("name", "Video")),
//!     )
//!     .await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;

use reel_core::{
    ByteSource, Error, Form, HttpClient, HttpClientStreamingBody, Method, Params, Part, RawParams,
    ReaderSource, Request, Response, Result, StreamingBody, StreamingForm, normalize,
};

use crate::HyperClient;
use crate::config::MediaConfig;

/// Field name the write API expects for the binary part of an upload.
const FILE_FIELD: &str = "file";

/// Client for the media-management API.
///
/// Generic over the transport so tests can substitute a recording client;
/// defaults to [`HyperClient`]. Each instance owns its token, headers, and
/// timeout - concurrent clients are fully independent.
#[derive(Debug, Clone)]
pub struct MediaClient<C = HyperClient> {
    http: C,
    token: String,
    config: MediaConfig,
}

impl MediaClient<HyperClient> {
    /// Create a client for the production endpoints with a default transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the default endpoint URLs fail to parse.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_transport(
            HyperClient::new(),
            token,
            MediaConfig::new()?,
        ))
    }
}

impl<C> MediaClient<C> {
    /// Create a client over an explicit transport and configuration.
    pub fn with_transport(http: C, token: impl Into<String>, config: MediaConfig) -> Self {
        Self {
            http,
            token: token.into(),
            config,
        }
    }

    /// Merge headers into the set sent with every request.
    pub fn set_http_headers(&mut self, headers: HashMap<String, String>) {
        self.config.headers.extend(headers);
    }

    /// Set the per-call deadline, in seconds.
    pub fn set_timeout(&mut self, seconds: u64) {
        self.config.timeout = Some(Duration::from_secs(seconds));
    }

    /// The media configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &C {
        &self.http
    }

    /// Apply the per-client deadline, when one is set.
    async fn dispatch<F>(&self, fut: F) -> Result<Response<Bytes>>
    where
        F: Future<Output = Result<Response<Bytes>>>,
    {
        match self.config.timeout {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .map_err(|_| Error::Timeout)?,
            None => fut.await,
        }
    }
}

impl<C: HttpClient> MediaClient<C> {
    /// Execute a read command over GET.
    ///
    /// Parameters may be a [`reel_core::Params`] map or a raw
    /// `key=value&key=value` query string; either way the canonical query
    /// (including `command` and `token`) lands in the URL, with list values
    /// as repeated keys.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization or the request fails.
    pub async fn get(
        &self,
        command: &str,
        params: impl Into<RawParams> + Send,
    ) -> Result<Response<Bytes>> {
        let query = normalize(command, &self.token, params)?;
        let request = Request::builder(Method::Get, self.config.read_url.clone())
            .headers(self.config.headers.clone())
            .query_pairs(query.to_query_pairs())
            .build();
        self.dispatch(self.http.execute(request)).await
    }

    /// Execute a write command over POST with a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization or the request fails.
    pub async fn post(
        &self,
        command: &str,
        params: impl Into<RawParams> + Send,
    ) -> Result<Response<Bytes>> {
        let query = normalize(command, &self.token, params)?;
        let request = Request::builder(Method::Post, self.config.write_url.clone())
            .headers(self.config.headers.clone())
            .form_pairs(&query.to_query_pairs())?
            .build();
        self.dispatch(self.http.execute(request)).await
    }

    /// Upload a file buffered in memory.
    ///
    /// The whole payload is read up front and sent as one multipart body;
    /// the part's content type is guessed from the filename extension. Use
    /// [`MediaClient::post_file_streaming`] for payloads that should not be
    /// materialized in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if normalization or
    /// the request fails.
    pub async fn post_file(
        &self,
        command: &str,
        path: impl AsRef<Path> + Send,
        params: impl Into<RawParams> + Send,
    ) -> Result<Response<Bytes>> {
        let path = path.as_ref();
        let query = normalize(command, &self.token, params)?;
        let filename = filename_of(path)?;

        let payload = tokio::fs::read(path)
            .await
            .map_err(|e| Error::stream_read(format!("read {}: {e}", path.display())))?;

        let form = Form::from_params(&query).part(Part::file(FILE_FIELD, filename, payload));
        let (content_type, body) = form.into_body();

        let request = Request::builder(Method::Post, self.config.write_url.clone())
            .headers(self.config.headers.clone())
            .header("Content-Type", content_type)
            .body(body)
            .build();
        self.dispatch(self.http.execute(request)).await
    }
}

impl<C: HttpClientStreamingBody> MediaClient<C> {
    /// Upload a file as a chunked multipart stream.
    ///
    /// The file is read in fixed-size chunks, so peak memory stays bounded
    /// regardless of file size.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, if normalization
    /// fails, or if the request or a mid-stream read fails.
    pub async fn post_file_streaming(
        &self,
        command: &str,
        path: impl AsRef<Path> + Send,
        content_type: &str,
        params: impl Into<RawParams> + Send,
    ) -> Result<Response<Bytes>> {
        let path = path.as_ref();
        let query = normalize(command, &self.token, params)?;
        let filename = filename_of(path)?;
        let source = ReaderSource::open(path).await?;
        self.post_multipart_stream(&query, filename, content_type, source)
            .await
    }

    /// Upload from any open byte source as a chunked multipart stream.
    ///
    /// The source may be an in-memory buffer, an open reader, or a live
    /// HTTP download wrapped in a [`reel_core::StreamSource`] - it is
    /// consumed exactly once and closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization fails, or if the request or a
    /// mid-stream read fails.
    pub async fn post_io_streaming<S>(
        &self,
        command: &str,
        source: S,
        filename: &str,
        content_type: &str,
        params: impl Into<RawParams> + Send,
    ) -> Result<Response<Bytes>>
    where
        S: ByteSource + 'static,
    {
        let query = normalize(command, &self.token, params)?;
        self.post_multipart_stream(&query, filename.to_string(), content_type, source)
            .await
    }

    async fn post_multipart_stream<S>(
        &self,
        query: &Params,
        filename: String,
        content_type: &str,
        source: S,
    ) -> Result<Response<Bytes>>
    where
        S: ByteSource + 'static,
    {
        let form = StreamingForm::new(FILE_FIELD, filename, content_type).fields_from(query);
        let multipart_content_type = form.content_type();
        let body: StreamingBody = form.into_stream(source);

        let request = Request::<StreamingBody>::builder(Method::Post, self.config.write_url.clone())
            .headers(self.config.headers.clone())
            .header("Content-Type", multipart_content_type)
            .body(body)
            .build();
        self.dispatch(self.http.execute_streaming_body(request)).await
    }
}

/// File name component of a path, as UTF-8.
fn filename_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::invalid_request(format!("path has no usable file name: {}", path.display()))
        })
}
