//! Settings structs.
//!
//! Every struct uses `#[serde(default)]` so a partial JSON file only needs to
//! name the keys it changes.

use serde::{Deserialize, Serialize};

/// Instruction sent with every LLM request of a run.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert desktop operator. \
Use the computer tool to complete the user's task. \
ONLY take a screenshot when needed. Prefer keyboard shortcuts. \
NEVER send empty key combos; always include a valid key or hotkey like 'cmd+space'. \
When using key/hold_key, provide 'key' or 'keys' as a non-empty string (e.g., 'cmd+space', 'ctrl+c'). \
For any action with coordinates, set coordinate_space='auto' in tool input.";

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Listener and connection settings.
    pub server: ServerSettings,
    /// Orchestrator settings.
    pub agent: AgentSettings,
    /// LLM provider settings.
    pub provider: ProviderSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
    /// Attachment content store settings.
    pub attachments: AttachmentSettings,
}

impl Settings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.agent.max_iterations_limit == 0 {
            return Err(crate::SettingsError::InvalidValue(
                "agent.maxIterationsLimit must be >= 1".into(),
            ));
        }
        if self.agent.default_max_iterations == 0
            || self.agent.default_max_iterations > self.agent.max_iterations_limit
        {
            return Err(crate::SettingsError::InvalidValue(format!(
                "agent.defaultMaxIterations must be in 1..={}",
                self.agent.max_iterations_limit
            )));
        }
        if self.server.event_buffer == 0 {
            return Err(crate::SettingsError::InvalidValue(
                "server.eventBuffer must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// WebSocket listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Interval between server pings, in seconds.
    pub heartbeat_interval_secs: u64,
    /// Close a connection after this long without a pong, in seconds.
    pub heartbeat_timeout_secs: u64,
    /// Capacity of each connection's job-event channel.
    pub event_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            max_message_size: 16 * 1024 * 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            event_buffer: 256,
        }
    }
}

/// Orchestrator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Iteration ceiling when `agent.run` omits `maxIterations`.
    pub default_max_iterations: u32,
    /// Upper bound accepted for `maxIterations`.
    pub max_iterations_limit: u32,
    /// How long session creation may wait for the backend, in milliseconds.
    pub session_ready_timeout_ms: u64,
    /// System instruction for every run.
    pub system_prompt: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            default_max_iterations: 30,
            max_iterations_limit: 200,
            session_ready_timeout_ms: 10_000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// LLM provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Provider used when a request omits `provider`.
    pub default_provider: String,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// `max_tokens` per request.
    pub max_tokens: u32,
    /// Computer-use tool version declared to the model.
    pub computer_tool_type: String,
    /// Value of the `anthropic-beta` header.
    pub beta: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Retries for overloaded, rate-limited or unreachable provider calls.
    pub max_retries: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            computer_tool_type: "computer_20250124".to_string(),
            beta: "computer-use-2025-01-24".to_string(),
            request_timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of the compact format.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Attachment content store settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentSettings {
    /// Directory holding uploaded files named by file id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<String>,
}
