//! LLM integration
//!
//! Provides the OpenRouter client used for model-backed task analysis and
//! the `TextGenerator` trait the analyzer depends on.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientBuilder, TextGenerator};
pub use types::{ChatRequest, ChatResponse, LlmResponse, Message, MessageRole};
