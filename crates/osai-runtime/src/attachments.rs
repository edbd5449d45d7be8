//! Prior context and uploaded attachments, turned into the opening turns of
//! a run's transcript.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use osai_core::{ContentPart, Message, Role};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::errors::StoreError;

/// Resolves an attachment id to its bytes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load the full content of `file_id`.
    async fn load(&self, file_id: &str) -> Result<Vec<u8>, StoreError>;
}

/// Store backed by a flat upload directory; ids are file names inside it.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Serve files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The upload directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_plain_name(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".."
}

#[async_trait]
impl ContentStore for DirectoryStore {
    async fn load(&self, file_id: &str) -> Result<Vec<u8>, StoreError> {
        if !is_plain_name(file_id) {
            return Err(StoreError::InvalidId(file_id.to_owned()));
        }
        match tokio::fs::read(self.root.join(file_id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(file_id.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A prior turn supplied with `agent.run`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContextMessage {
    /// `user` or `assistant`.
    pub role: String,
    /// Turn text.
    pub text: String,
}

/// An uploaded file referenced by `agent.run`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Store id. Numeric ids are accepted and kept in decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub file_id: String,
    /// Original file name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared MIME type.
    #[serde(default)]
    pub mime: Option<String>,
}

impl Attachment {
    /// Declared MIME type, else one guessed from the name.
    pub fn media_type(&self) -> &str {
        if let Some(mime) = self.mime.as_deref().filter(|m| !m.is_empty()) {
            return mime;
        }
        let ext = self
            .name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected a string or number id, got {other}"))),
    }
}

/// Parse a JSON array leniently: entries that don't fit are skipped.
pub fn parse_list<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(error = %e, "skipping malformed list entry");
                None
            }
        })
        .collect()
}

/// Context turns first, then one user image turn per loadable attachment.
///
/// Unknown roles and unloadable attachments are skipped.
pub async fn build_initial_transcript(
    context: &[ContextMessage],
    attachments: &[Attachment],
    store: &dyn ContentStore,
) -> Vec<Message> {
    let mut messages: Vec<Message> = context
        .iter()
        .filter_map(|m| {
            let role = Role::parse(&m.role)?;
            Some(Message {
                role,
                content: vec![ContentPart::text(m.text.clone())],
            })
        })
        .collect();

    for attachment in attachments {
        match store.load(&attachment.file_id).await {
            Ok(bytes) => messages.push(Message::user(vec![ContentPart::image(
                attachment.media_type(),
                &bytes,
            )])),
            Err(e) => debug!(file_id = %attachment.file_id, error = %e, "failed to load attachment"),
        }
    }
    messages
}
