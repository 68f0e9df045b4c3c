//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use reel::prelude::*;
//! ```

pub use crate::{
    BufferSource, ByteSource, ClientConfig, ContentType, Error, Form, HttpClient, HttpClientExt,
    HttpClientStreaming, HttpClientStreamingBody, HyperClient, MediaClient, MediaConfig, Method,
    ParamValue, Params, Part, RawParams, ReaderSource, Request, RequestBuilder, Response, Result,
    StatusCode, StreamSource, StreamingForm, StreamingResponse, from_json, header, normalize,
    to_json,
};
pub use serde::{Deserialize, Serialize};
