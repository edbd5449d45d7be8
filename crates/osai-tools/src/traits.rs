//! The trait every desktop tool implements.

use osai_core::{ContentPart, ToolDescriptor};
use serde_json::Value;

use crate::errors::ToolError;

/// A tool the model can call.
///
/// Execution is synchronous and may block on OS operations; the runtime
/// calls it from a blocking worker, never from a connection's task.
pub trait DesktopTool: Send + Sync {
    /// Tool name, the exact string sent to and from the LLM.
    fn name(&self) -> &str;

    /// Declaration for the LLM, built from current OS state.
    fn descriptor(&self) -> Result<ToolDescriptor, ToolError>;

    /// Run one call and return its result parts in order.
    fn execute(&self, input: &Value) -> Result<Vec<ContentPart>, ToolError>;
}
