//! RPC dependency-injection context.

use std::sync::Arc;

use osai_runtime::{ContentStore, Credential, JobRegistry, SessionFactory};
use osai_settings::AgentSettings;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::websocket::notify::JobMessage;

/// Process-wide collaborators shared by every connection.
pub struct ServerDeps {
    /// In-flight jobs, for `agent.cancel` and health.
    pub jobs: Arc<JobRegistry>,
    /// Builds a client and tool set per credential.
    pub sessions: Arc<dyn SessionFactory>,
    /// Resolves attachment ids.
    pub content_store: Arc<dyn ContentStore>,
    /// Iteration defaults, readiness timeout, system prompt.
    pub agent: AgentSettings,
    /// Credential used when a connection brings none.
    pub fallback_credential: Option<Credential>,
}

/// Per-connection context passed to every RPC handler.
///
/// The credential lives here and nowhere else, so concurrent connections
/// never see each other's keys.
pub struct RpcContext {
    /// Shared collaborators.
    pub deps: Arc<ServerDeps>,
    /// Connection id for logs.
    pub conn_id: String,
    /// Credential captured at handshake.
    pub credential: Option<Credential>,
    /// Job events back to this connection's loop.
    pub job_tx: mpsc::Sender<JobMessage>,
    /// Cancelled when the connection closes; parent of every job token.
    pub cancel: CancellationToken,
}
