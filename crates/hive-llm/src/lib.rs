//! Hive LLM - LLM Provider Abstraction
//!
//! This crate provides the language-model seam used by every agent:
//! - Provider: the `LlmProvider` trait agents complete against
//! - OpenAI-compatible: OpenAI, Groq and Ollama over the chat completions API
//! - Anthropic: Claude over the messages API
//! - Mock: queued responses for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod completion;
pub mod error;
pub mod factory;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{Error, Result};
pub use factory::{provider_from_selection, ProviderSelection};
pub use message::{coalesce, Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use provider::LlmProvider;
