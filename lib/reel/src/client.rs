//! HTTP client implementation using hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, BodyStream, Full, StreamBody};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use reel_core::{
    Error, Method, Request, Response, Result, StreamingBody, StreamingResponse,
};

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::middleware::LoggingLayer;

/// Request body handed to hyper: buffered or streamed, boxed either way.
///
/// A streamed body reports no exact size, so hyper falls back to chunked
/// transfer framing and never needs a Content-Length up front.
type HyperBody = UnsyncBoxBody<Bytes, Error>;

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
///
/// This type allows storing and composing arbitrary Tower layers without
/// exposing complex generic types to users.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// This wrapper uses a Mutex to make the service Sync, which is required
/// by the `HttpClient` trait.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// HTTPS Connector
// ============================================================================

/// Create an HTTPS connector with rustls.
///
/// Supports HTTP/1.1 and HTTP/2 with TLS using the Mozilla root certificates.
fn https_connector() -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build()
}

// ============================================================================
// Raw Client (internal, used for direct hyper access)
// ============================================================================

/// Raw HTTP client using hyper-util (internal implementation).
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, HyperBody>,
    config: ClientConfig,
}

impl RawHyperClient {
    fn new(config: ClientConfig) -> Self {
        let connector = https_connector();

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Build a hyper request from method, URL, headers, and a boxed body.
    fn build_hyper_request(
        method: Method,
        url: &url::Url,
        headers: &HashMap<String, String>,
        body: HyperBody,
    ) -> Result<http::Request<HyperBody>> {
        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn buffered_body(body: Option<Bytes>) -> HyperBody {
        body.map_or_else(Full::default, Full::new)
            .map_err(|never| match never {})
            .boxed_unsync()
    }

    fn streamed_body(body: StreamingBody) -> HyperBody {
        StreamBody::new(body.map_ok(Frame::data)).boxed_unsync()
    }

    /// Extract response headers as a `HashMap`.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn send(&self, hyper_request: http::Request<HyperBody>) -> Result<Response<Bytes>> {
        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let (method, url, headers, body) = request.into_parts();
        let hyper_request =
            Self::build_hyper_request(method, &url, &headers, Self::buffered_body(body))?;
        self.send(hyper_request).await
    }

    /// Execute a request whose body is a lazily-produced chunk stream.
    ///
    /// A chunk error aborts the request: hyper drops the connection without
    /// the chunked-encoding terminator, so the peer never sees a truncated
    /// body as complete.
    async fn execute_streaming_body(
        &self,
        request: Request<StreamingBody>,
    ) -> Result<Response<Bytes>> {
        let (method, url, headers, body) = request.into_parts();
        let body = body.map_or_else(
            || RawHyperClient::buffered_body(None),
            RawHyperClient::streamed_body,
        );
        let hyper_request = Self::build_hyper_request(method, &url, &headers, body)?;
        self.send(hyper_request).await
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        // A failed body stream travels inside hyper's error chain; surface
        // it as the stream-read failure it is rather than a connection error.
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(Error::StreamRead(msg)) = cause.downcast_ref::<Error>() {
                return Error::stream_read(msg.clone());
            }
            source = cause.source();
        }

        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }

    /// Execute a request and return a streaming response.
    async fn execute_streaming(&self, request: Request<Bytes>) -> Result<StreamingResponse> {
        let (method, url, headers, body) = request.into_parts();
        let hyper_request =
            Self::build_hyper_request(method, &url, &headers, Self::buffered_body(body))?;

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body_stream = BodyStream::new(response.into_body());
        let streaming_body: StreamingBody = Box::pin(
            body_stream
                .map_ok(|frame| frame.into_data().unwrap_or_default())
                .map_err(|e| Error::connection(e.to_string())),
        );

        Ok(StreamingResponse::new(
            status,
            response_headers,
            streaming_body,
        ))
    }
}

impl Service<Request<Bytes>> for RawHyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// HTTP client using hyper-util with connection pooling, TLS, and middleware
/// support.
///
/// # Example
///
/// ```ignore
/// use reel::HyperClient;
/// use std::time::Duration;
///
/// // Simple client without middleware
/// let client = HyperClient::new();
///
/// // Client with request logging
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(300))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let raw = RawHyperClient::new(config.clone());
        Self {
            service: SyncService::new(BoxCloneService::new(raw)),
            config,
        }
    }

    /// Create a client with a pre-configured service (used by builder).
    fn with_service(service: BoxedService, config: ClientConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl reel_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.service.call(request).await
    }
}

/// Streaming request bodies.
///
/// Note: streaming bypasses middleware since the body cannot be replayed or
/// buffered for inspection. Middleware applies to the buffered `execute()`.
impl reel_core::HttpClientStreamingBody for HyperClient {
    async fn execute_streaming_body(
        &self,
        request: Request<StreamingBody>,
    ) -> Result<Response<Bytes>> {
        let raw_client = RawHyperClient::new(self.config.clone());
        raw_client.execute_streaming_body(request).await
    }
}

/// Streaming response bodies.
///
/// Note: streaming bypasses middleware since we need to return the raw hyper
/// response body. Middleware applies to the buffered `execute()`.
impl reel_core::HttpClientStreaming for HyperClient {
    async fn execute_streaming(&self, request: Request<Bytes>) -> Result<StreamingResponse> {
        let raw_client = RawHyperClient::new(self.config.clone());
        raw_client.execute_streaming(request).await
    }
}

// ============================================================================
// Tower Service Implementation
// ============================================================================

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // SyncService is always ready (the underlying service is polled when called)
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperClient`].
///
/// # Example
///
/// ```ignore
/// use reel::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(300))
///     .with_logging()
///     .build();
/// ```
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Set the request timeout (applied at the connection level, not middleware).
    ///
    /// Uploads of large payloads may need a generous value here.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Add a Tower layer to the client.
    ///
    /// Layers are applied in order: first added = outermost (processes
    /// requests first).
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers and more detail).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the client with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let raw = RawHyperClient::new(config.clone());

        // Start with base service
        let mut service: BoxedService = BoxCloneService::new(raw);

        // Apply user layers in order (first added = outermost)
        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperClient::with_service(service, config)
    }
}
