//! # osai-core
//!
//! Foundation types shared by every OS-AI crate:
//!
//! - **Branded IDs**: `SessionId`, `JobId` as newtypes over UUID v7 strings
//! - **Messages**: `Message` with a `Role` and ordered `ContentPart`s
//! - **Tools**: `ToolDescriptor` declared to the LLM, `ToolCall` intents back
//! - **Usage**: `TokenUsage` counters accumulated across a run
//! - **Logging**: `init_subscriber` for the process-wide `tracing` subscriber

#![deny(unsafe_code)]

pub mod content;
pub mod ids;
pub mod logging;
pub mod tools;
pub mod usage;

pub use content::{ContentPart, Message, Role};
pub use ids::{JobId, SessionId};
pub use tools::{ToolCall, ToolDescriptor, ToolKind};
pub use usage::TokenUsage;
