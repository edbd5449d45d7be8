//! Typed events a run emits while it progresses.

use async_trait::async_trait;
use osai_core::TokenUsage;
use serde_json::Value;

/// One observable step of a run, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentEvent {
    /// The model produced text.
    AssistantText {
        /// Joined text of the reply.
        text: String,
    },
    /// The model asked for a tool call; emitted before dispatch.
    ToolCall {
        /// Provider call id.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input.
        input: Value,
    },
    /// A text part of a tool result.
    ToolResultText {
        /// Call this answers.
        tool_use_id: String,
        /// Tool name.
        name: String,
        /// Result text.
        text: String,
        /// Whether the call failed.
        is_error: bool,
    },
    /// An image part of a tool result.
    ToolResultImage {
        /// Call this answers.
        tool_use_id: String,
        /// Image MIME type.
        media_type: String,
        /// Base64 image bytes.
        data: String,
    },
    /// An iteration is starting.
    Progress {
        /// 1-based iteration number.
        iteration: u32,
        /// Ceiling for this run.
        max_iterations: u32,
    },
    /// Cumulative usage after an LLM response.
    Usage(TokenUsage),
}

/// Receives a run's events. Implementations must not reorder them.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event. Delivery failures are the sink's concern.
    async fn emit(&self, event: AgentEvent);
}
