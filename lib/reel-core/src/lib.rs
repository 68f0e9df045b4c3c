//! Core types for the reel media-management API client.
//!
//! This crate provides the transport-agnostic foundations:
//! - [`Params`], [`ParamValue`], [`RawParams`], [`normalize`] - Parameter
//!   shapes and normalization into the canonical query
//! - [`Form`], [`Part`], [`StreamingForm`] - Multipart body encoding,
//!   buffered and streaming
//! - [`ByteSource`] and its adapters - Payload sources for streaming uploads
//! - [`Method`], [`Request`], [`RequestBuilder`], [`Response`] - HTTP
//!   request/response types
//! - [`HttpClient`], [`HttpClientStreamingBody`], [`HttpClientStreaming`] -
//!   Client traits the transport implements
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`] and [`header`] - Re-exported from the `http` crate

mod body;
mod client;
mod error;
mod method;
pub mod multipart;
mod params;
pub mod prelude;
mod request;
mod response;
mod source;

pub use body::{ContentType, from_json, to_form_pairs, to_json};
pub use client::{HttpClient, HttpClientExt, HttpClientStreaming, HttpClientStreamingBody};
pub use error::{Error, Result};
pub use method::Method;
pub use multipart::{Form, Part, StreamingForm};
pub use params::{ParamValue, Params, RawParams, normalize};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use response::streaming::{StreamingBody, StreamingResponse};
pub use source::{BufferSource, ByteSource, CHUNK_SIZE, ReaderSource, StreamSource};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
