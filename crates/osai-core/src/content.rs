//! Conversation messages and their content parts.
//!
//! A [`Message`] is one turn in a run's transcript. Its [`ContentPart`]s are
//! tagged with `type` on the wire so the same shape can be replayed to the
//! LLM client and logged.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation (task, attachments, tool results).
    User,
    /// The model side of the conversation.
    Assistant,
}

impl Role {
    /// Parse a role name, accepting only `user` and `assistant`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One part of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An image with its media type and base64-encoded bytes.
    Image {
        /// MIME type, e.g. `image/png`.
        media_type: String,
        /// Base64 (standard alphabet) encoded image bytes.
        data: String,
    },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Provider-assigned call id.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input object.
        input: Value,
    },
    /// The result of a tool invocation, sent back on the next user turn.
    ToolResult {
        /// Id of the `ToolUse` this answers.
        tool_use_id: String,
        /// Result parts (text or image).
        content: Vec<ContentPart>,
        /// Whether the tool failed.
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentPart {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image part from raw bytes.
    pub fn image(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Image {
            media_type: media_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// The text of a `Text` part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this part is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// One conversational turn. Immutable once appended to a transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl Message {
    /// User message with the given parts.
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Assistant message with the given parts.
    pub fn assistant(content: Vec<ContentPart>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// User message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentPart::text(text)])
    }

    /// Assistant message with a single text part.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![ContentPart::text(text)])
    }

    /// Concatenation of all text parts, newline separated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
