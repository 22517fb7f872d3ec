//! Endpoint implementations for hosted completion services.

pub mod openai;

// Re-export commonly used provider types
pub use openai::OpenAIEndpoints;
