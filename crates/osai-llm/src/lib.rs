//! # osai-llm
//!
//! The language-model side of the agent loop.
//!
//! - [`LlmClient`]: conversation in, text and/or tool calls out, with usage
//! - [`ProviderError`]: transport and API failures, with [`ProviderError::is_auth`]
//!   identifying credential rejections
//! - [`anthropic::AnthropicClient`]: reference client for the Anthropic Messages API,
//!   retrying transient failures per [`RetryPolicy`]

#![deny(unsafe_code)]

pub mod anthropic;
pub mod error_parsing;
pub mod provider;
pub mod retry;

pub use provider::{LlmClient, LlmRequest, LlmResponse, ProviderError, ProviderResult};
pub use retry::RetryPolicy;
