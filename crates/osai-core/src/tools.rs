//! Tool declarations sent to the LLM and tool-call intents coming back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a tool is declared to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Provider-native computer-use tool (display dimensions in the config).
    ComputerUse,
    /// Generic function tool (`description` and `input_schema` in the config).
    Function,
}

/// Declares one callable capability to the LLM client.
///
/// Built fresh for every run so display dimensions reflect the screen at
/// that moment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name the model will call.
    pub name: String,
    /// Declaration kind.
    pub kind: ToolKind,
    /// Kind-specific configuration, e.g. `display_width_px`.
    pub config: Map<String, Value>,
}

impl ToolDescriptor {
    /// Descriptor with an empty config.
    pub fn new(name: impl Into<String>, kind: ToolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            config: Map::new(),
        }
    }

    /// Builder-style config entry.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        let _ = self.config.insert(key.to_owned(), value.into());
        self
    }
}

/// A tool invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back in the result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Tool input.
    pub input: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_config() {
        let d = ToolDescriptor::new("computer", ToolKind::ComputerUse)
            .with("display_width_px", 1440)
            .with("display_height_px", 900);
        assert_eq!(d.config["display_width_px"], 1440);
        assert_eq!(d.config["display_height_px"], 900);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(ToolKind::ComputerUse).unwrap();
        assert_eq!(v, "computer_use");
    }
}
