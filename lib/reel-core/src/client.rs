//! HTTP client traits.
//!
//! - [`HttpClient`] - buffered HTTP execution
//! - [`HttpClientStreamingBody`] - execution with a streaming request body
//! - [`HttpClientStreaming`] - execution with a streaming response body
//!
//! The media client is generic over these traits; implement them to swap the
//! transport (or to mock it in tests).

use std::future::Future;

use bytes::Bytes;

use crate::response::streaming::{StreamingBody, StreamingResponse};
use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// This trait defines the interface for executing buffered HTTP requests.
/// Implementations should be async-first and support connection pooling.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid response
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

/// HTTP client trait for streaming request bodies.
///
/// The request body is a lazily-produced chunk sequence (for example the
/// output of [`crate::StreamingForm::into_stream`]). Implementations must
/// not buffer the whole body: chunks are transmitted as they are produced,
/// using chunked transfer framing, and a body chunk error aborts the
/// request rather than framing a truncated body as complete.
pub trait HttpClientStreamingBody: Send + Sync {
    /// Execute a request whose body is a chunk stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, including a
    /// [`crate::Error::StreamRead`] surfaced from the body stream.
    fn execute_streaming_body(
        &self,
        request: Request<StreamingBody>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

/// HTTP client trait for streaming response bodies.
///
/// Unlike [`HttpClient::execute`], the response body is yielded chunk by
/// chunk as it arrives, so a large download can feed an upload without
/// materializing in memory.
pub trait HttpClientStreaming: HttpClient {
    /// Execute an HTTP request and return a streaming response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason.
    fn execute_streaming(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send;
}

/// Extension trait for [`HttpClient`] with convenience methods.
pub trait HttpClientExt: HttpClient {
    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn get(&self, url: &str) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(crate::Method::Get, url).build();
            self.execute(request).await
        }
    }

    /// Execute a POST request with a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails.
    fn post_form(
        &self,
        url: &str,
        pairs: &[(String, String)],
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(crate::Method::Post, url)
                .form_pairs(pairs)?
                .build();
            self.execute(request).await
        }
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails.
    fn post_json<T: serde::Serialize + Send + Sync>(
        &self,
        url: &str,
        body: &T,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        async move {
            let url = url::Url::parse(url)?;
            let request = Request::builder(crate::Method::Post, url)
                .json(body)?
                .build();
            self.execute(request).await
        }
    }
}

// Blanket implementation for all HttpClient implementors
impl<T: HttpClient> HttpClientExt for T {}
