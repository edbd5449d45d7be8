//! RPC method handlers and shared parameter helpers.

pub mod agent;
pub mod session;

use std::time::Duration;

use osai_runtime::{AgentSession, CredentialError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::registry::MethodRegistry;

/// Register every method this server speaks.
pub fn register_all(registry: &mut MethodRegistry) {
    registry.register("session.create", session::CreateSessionHandler);
    registry.register("agent.run", agent::RunAgentHandler);
    registry.register("agent.cancel", agent::CancelAgentHandler);
}

/// `params` as an object; absent or `null` is `None`, anything else is
/// invalid.
pub(crate) fn params_object(params: Option<&Value>) -> Result<Option<&Map<String, Value>>, RpcError> {
    match params {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(RpcError::invalid_params("params must be an object")),
    }
}

/// Optional string parameter. `null` counts as absent.
pub(crate) fn opt_string_param<'a>(
    params: Option<&'a Map<String, Value>>,
    key: &str,
) -> Result<Option<&'a str>, RpcError> {
    match params.and_then(|p| p.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RpcError::invalid_params(format!("'{key}' must be a string"))),
    }
}

/// Build a session for this connection's credential under the readiness
/// timeout.
pub(crate) async fn open_session(
    ctx: &RpcContext,
    provider: Option<&str>,
) -> Result<AgentSession, RpcError> {
    let Some(credential) = ctx.credential.as_ref() else {
        warn!(conn_id = %ctx.conn_id, "no credential for session");
        return Err(CredentialError::Missing.into());
    };
    let timeout = Duration::from_millis(ctx.deps.agent.session_ready_timeout_ms);
    match tokio::time::timeout(timeout, ctx.deps.sessions.create(provider, Some(credential))).await
    {
        Ok(Ok(session)) => {
            debug!(conn_id = %ctx.conn_id, session_id = %session.id, provider = %session.provider, "session ready");
            Ok(session)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_elapsed) => {
            warn!(conn_id = %ctx.conn_id, timeout_ms = ctx.deps.agent.session_ready_timeout_ms, "session backend not ready");
            Err(RpcError::Internal {
                message: "Session backend not ready".into(),
            })
        }
    }
}
