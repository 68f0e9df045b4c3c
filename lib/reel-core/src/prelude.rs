//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use reel_core::prelude::*;
//! ```

pub use crate::{
    BufferSource, ByteSource, ContentType, Error, Form, HttpClient, HttpClientExt,
    HttpClientStreaming, HttpClientStreamingBody, Method, ParamValue, Params, Part, RawParams,
    ReaderSource, Request, RequestBuilder, Response, Result, StreamSource, StreamingForm,
    from_json, normalize, to_json,
};
