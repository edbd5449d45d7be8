//! WebSocket message dispatch. Parses incoming text as a JSON-RPC request
//! and routes it through the `MethodRegistry`.

use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::registry::MethodRegistry;
use crate::rpc::types::{RpcRequest, RpcResponse};

/// Result of handling a WebSocket message.
pub struct HandleResult {
    /// Serialized JSON response to send back.
    pub response_json: String,
    /// The RPC method that was called (`None` if the frame never got that far).
    pub method: Option<String>,
    /// Typed response.
    pub response: RpcResponse,
}

/// Handle one incoming text frame. Every frame gets exactly one response.
#[instrument(skip_all, fields(method))]
pub async fn handle_message(
    message: &str,
    registry: &MethodRegistry,
    ctx: &RpcContext,
) -> HandleResult {
    let value: Value = match serde_json::from_str(message) {
        Ok(v) => v,
        Err(e) => {
            warn!(conn_id = %ctx.conn_id, error = %e, "invalid JSON received");
            return finish(RpcResponse::from_error(Value::Null, RpcError::Parse.to_error_body()), None);
        }
    };

    let request = match into_request(value) {
        Ok(r) => r,
        Err(id) => {
            warn!(conn_id = %ctx.conn_id, "invalid JSON-RPC request");
            return finish(
                RpcResponse::from_error(id, RpcError::InvalidRequest.to_error_body()),
                None,
            );
        }
    };

    let method = request.method.clone();
    let _ = tracing::Span::current().record("method", method.as_str());
    debug!(conn_id = %ctx.conn_id, method, id = %request.id, "dispatching RPC");

    let response = registry.dispatch(request, ctx).await;
    finish(response, Some(method))
}

/// Shape a parsed value into a request. On failure, returns the id to echo.
fn into_request(value: Value) -> Result<RpcRequest, Value> {
    let Value::Object(mut obj) = value else {
        return Err(Value::Null);
    };
    let id = obj.remove("id").unwrap_or(Value::Null);
    let method = match obj.remove("method") {
        Some(Value::String(m)) => m,
        _ => return Err(id),
    };
    let params = match obj.remove("params") {
        None | Some(Value::Null) => None,
        Some(p) => Some(p),
    };
    Ok(RpcRequest { id, method, params })
}

fn finish(response: RpcResponse, method: Option<String>) -> HandleResult {
    let response_json = serde_json::to_string(&response).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize response");
        String::new()
    });
    HandleResult {
        response_json,
        method,
        response,
    }
}
