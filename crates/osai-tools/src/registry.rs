//! Tool registry: maps declared tool names to implementations and
//! normalizes every call's outcome into content parts.

use std::collections::HashMap;
use std::sync::Arc;

use osai_core::{ContentPart, ToolCall, ToolDescriptor};
use tracing::{debug, warn};

use crate::errors::ToolError;
use crate::traits::DesktopTool;

/// Normalized result of one tool call.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutput {
    /// Result parts (text or image), never empty.
    pub parts: Vec<ContentPart>,
    /// Whether the call failed.
    pub is_error: bool,
}

impl ToolOutput {
    fn error(message: String) -> Self {
        Self {
            parts: vec![ContentPart::text(message)],
            is_error: true,
        }
    }

    /// Wrap as a `tool_result` part answering `tool_use_id`.
    pub fn into_result_part(self, tool_use_id: impl Into<String>) -> ContentPart {
        ContentPart::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: self.parts,
            is_error: self.is_error,
        }
    }
}

/// Central registry mapping tool names to their implementations.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DesktopTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Overwrites any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn DesktopTool>) {
        debug!(tool_name = tool.name(), "tool registered");
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DesktopTool>> {
        self.tools.get(name).cloned()
    }

    /// Return all tool names, sorted alphabetically.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Fresh descriptors for every tool, sorted by name.
    pub fn descriptors(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        let mut descriptors = self
            .tools
            .values()
            .map(|t| t.descriptor())
            .collect::<Result<Vec<_>, _>>()?;
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }

    /// Execute a call, turning every failure into an error output.
    ///
    /// Blocks for as long as the tool does.
    pub fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "model called unknown tool");
            return ToolOutput::error(format!("Unknown tool: {}", call.name));
        };
        match tool.execute(&call.input) {
            Ok(parts) if parts.is_empty() => ToolOutput {
                parts: vec![ContentPart::text("ok")],
                is_error: false,
            },
            Ok(parts) => ToolOutput {
                parts,
                is_error: false,
            },
            Err(e) => {
                debug!(tool = %call.name, error = %e, "tool call failed");
                ToolOutput::error(format!("Error: {e}"))
            }
        }
    }
}
