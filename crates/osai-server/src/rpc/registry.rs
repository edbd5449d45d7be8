//! Method registry and async dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, warn};

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::types::{RpcRequest, RpcResponse};

/// Trait implemented by every RPC method handler.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Execute the handler with the given params and context.
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError>;
}

/// Registry mapping method names to handlers.
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a method name.
    pub fn register(&mut self, method: &str, handler: impl MethodHandler + 'static) {
        let _ = self.handlers.insert(method.to_owned(), Arc::new(handler));
    }

    /// Maximum time a single RPC handler is allowed to run.
    const HANDLER_TIMEOUT: Duration = Duration::from_secs(60);

    /// Dispatch a request to its handler. Always produces a response.
    pub async fn dispatch(&self, request: RpcRequest, ctx: &RpcContext) -> RpcResponse {
        let RpcRequest { id, method, params } = request;

        let Some(handler) = self.handlers.get(&method) else {
            warn!(method, "unknown RPC method");
            return RpcResponse::from_error(id, RpcError::MethodNotFound { method }.to_error_body());
        };

        let start = std::time::Instant::now();
        let result = tokio::time::timeout(Self::HANDLER_TIMEOUT, handler.handle(params, ctx)).await;

        let response = match result {
            Ok(Ok(result)) => RpcResponse::success(id, result),
            Ok(Err(err)) => {
                warn!(method, code = err.code(), error = %err, "RPC handler failed");
                RpcResponse::from_error(id, err.to_error_body())
            }
            Err(_elapsed) => {
                error!(method, "RPC handler timed out after {:?}", Self::HANDLER_TIMEOUT);
                let err = RpcError::Internal {
                    message: format!("Handler for '{method}' timed out"),
                };
                RpcResponse::from_error(id, err.to_error_body())
            }
        };

        let duration = start.elapsed();
        if duration.as_secs() >= 5 {
            warn!(
                method,
                duration_secs = duration.as_secs_f64(),
                "slow RPC request"
            );
        }

        response
    }

    /// List all registered method names (sorted).
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a method is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}
