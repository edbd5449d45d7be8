//! Session handler: create.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{open_session, opt_string_param, params_object};
use crate::rpc::registry::MethodHandler;

/// Create a session and report its capabilities.
pub struct CreateSessionHandler;

#[async_trait]
impl MethodHandler for CreateSessionHandler {
    #[instrument(skip(self, ctx), fields(method = "session.create", conn_id = %ctx.conn_id))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params_object(params.as_ref())?;
        let provider = opt_string_param(params, "provider")?;

        let session = open_session(ctx, provider).await?;
        info!(session_id = %session.id, provider = %session.provider, "session created");

        Ok(json!({
            "sessionId": session.id,
            "capabilities": session.capabilities,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::context::test_helpers::make_context;
    use crate::rpc::errors;

    #[tokio::test]
    async fn missing_credential_is_credential_error() {
        let (ctx, _rx) = make_context(None);
        let err = CreateSessionHandler.handle(None, &ctx).await.unwrap_err();
        assert_eq!(err.code(), errors::CREDENTIAL_ERROR);
        assert_eq!(
            err.to_string(),
            "API key required. Please configure your Anthropic API key in Settings."
        );
    }

    #[tokio::test]
    async fn non_string_provider_rejected() {
        let (ctx, _rx) = make_context(Some("sk-test"));
        let err = CreateSessionHandler
            .handle(Some(json!({"provider": 5})), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.code(), errors::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn backend_failure_is_internal() {
        let (ctx, _rx) = make_context(Some("sk-test"));
        let err = CreateSessionHandler.handle(None, &ctx).await.unwrap_err();
        assert_eq!(err.code(), errors::INTERNAL_ERROR);
    }
}
