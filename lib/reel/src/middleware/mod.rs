//! Tower middleware layers for the reel HTTP client.
//!
//! This module provides composable middleware layers that can be applied to
//! the HTTP client using Tower's `Layer` trait. Layers apply to the buffered
//! request path; streaming uploads and downloads bypass middleware because
//! their bodies cannot be replayed.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//!
//! # Example
//!
//! ```ignore
//! use reel::HyperClient;
//!
//! let client = HyperClient::builder()
//!     .with_logging()
//!     .build();
//!
//! // Power users: raw layer access
//! use reel::middleware::LoggingLayer;
//! let client = HyperClient::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
