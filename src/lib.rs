//! One calling convention over the legacy completion and the chat completion endpoints.
//!
//! [`Client`] looks at the configured [`Engine`] and routes a conversation to
//! the matching endpoint family, either as one blocking request
//! ([`Client::do_once`]) or as a token stream ([`Client::do_stream`]). Every
//! response shape implements [`CompletionResponse`], so callers never need to
//! know which family answered. [`CompletionResponse::can_continue`] tells
//! whether a reply was cut off by the token cap.

pub mod accumulator;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod providers;
pub mod response;
pub mod sse_stream;
pub mod types;

// Re-export core types for easy usage
pub use accumulator::StreamAccumulator;
pub use client::Client;
pub use config::ClientConfig;
pub use error::Error;
pub use http::{ChunkHandler, HttpClient};
pub use provider::CompletionEndpoints;
pub use providers::*;
pub use response::*;
pub use sse_stream::SseFrame;
pub use types::*;
