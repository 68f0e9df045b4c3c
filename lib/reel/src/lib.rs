//! Async client for a remote media-management HTTP API.
//!
//! Builds authenticated GET/POST requests with canonical query encoding and
//! uploads media as multipart bodies - buffered, streamed from a file, or
//! streamed from any readable source, including a live HTTP download.
//!
//! # Example
//!
//! ```ignore
//! use reel::prelude::*;
//!
//! let client = MediaClient::new("mytoken")?;
//!
//! // Read API: canonical query in the URL
//! let response = client
//!     .get("search_videos", Params::new().with("any", vec!["tag:foo", "tag:bar"]))
//!     .await?;
//!
//! // Write API: chunked streaming upload, O(chunk) peak memory
//! let response = client
//!     .post_file_streaming(
//!         "create_video",
//!         "movie.mov",
//!         "video/quicktime",
//!         Params::new().with("video", Params::new().with("name", "Video")),
//!     )
//!     .await?;
//! ```

mod client;
mod config;
mod media;
pub mod middleware;
pub mod prelude;

// Re-export client types
pub use client::{HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_READ_URL, DEFAULT_WRITE_URL, MediaConfig};
pub use media::MediaClient;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use reel_core::{
    BufferSource, ByteSource, CHUNK_SIZE, ContentType, Error, Form, HttpClient, HttpClientExt,
    HttpClientStreaming, HttpClientStreamingBody, Method, ParamValue, Params, Part, RawParams,
    ReaderSource, Request, RequestBuilder, Response, Result, StreamSource, StreamingBody,
    StreamingForm, StreamingResponse, from_json, normalize, to_form_pairs, to_json,
};

// Re-export http types for status codes and headers
pub use reel_core::{StatusCode, header};

// Re-export crates callers commonly need alongside the client
pub use url;
