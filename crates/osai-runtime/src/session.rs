//! Session-scoped client and tool construction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use osai_core::SessionId;
use osai_llm::LlmClient;
use osai_tools::ToolRegistry;
use serde_json::{Value, json};

use crate::errors::SessionError;

/// A provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a non-blank secret.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// The secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Pick the connection's credential: the handshake value when present and
/// non-blank, else the process fallback.
pub fn resolve_credential(from_query: Option<&str>, fallback: Option<&str>) -> Option<Credential> {
    from_query
        .and_then(Credential::new)
        .or_else(|| fallback.and_then(Credential::new))
}

/// Capability summary advertised by `session.create`.
pub fn default_capabilities() -> Value {
    json!({ "ws": true, "jsonrpc": true })
}

/// A ready-to-run client and tool set bound to one credential.
#[derive(Clone)]
pub struct AgentSession {
    /// Session id handed to the client.
    pub id: SessionId,
    /// Resolved provider name.
    pub provider: String,
    /// LLM client holding the credential.
    pub client: Arc<dyn LlmClient>,
    /// Tools the session may call.
    pub tools: Arc<ToolRegistry>,
    /// Advertised capabilities.
    pub capabilities: Value,
}

impl fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSession")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("model", &self.client.model())
            .field("tools", &self.tools.names())
            .finish_non_exhaustive()
    }
}

/// Builds sessions. `provider` of `None` selects the default provider.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Build a session, failing with [`SessionError::Credential`] when
    /// `credential` is absent.
    async fn create(
        &self,
        provider: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<AgentSession, SessionError>;
}
