//! Core types used throughout the library.

pub mod conversation;
pub mod engine;
pub mod message;
pub mod request;

// Re-export commonly used types
pub use conversation::*;
pub use engine::*;
pub use message::*;
pub use request::*;
