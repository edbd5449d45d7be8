//! `OsAiServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use osai_runtime::{Credential, resolve_credential};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::rpc::context::ServerDeps;
use crate::rpc::handlers::register_all;
use crate::rpc::registry::MethodRegistry;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide collaborators.
    pub deps: Arc<ServerDeps>,
    /// RPC method registry.
    pub registry: Arc<MethodRegistry>,
    /// Server configuration.
    pub config: ServerConfig,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// One permit per open connection.
    pub permits: Arc<Semaphore>,
}

impl AppState {
    fn connection_count(&self) -> usize {
        self.config
            .max_connections
            .saturating_sub(self.permits.available_permits())
    }
}

/// Query string accepted on `/ws`.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Per-connection credential.
    pub anthropic_api_key: Option<String>,
}

/// The OS-AI server.
pub struct OsAiServer {
    config: ServerConfig,
    registry: Arc<MethodRegistry>,
    deps: Arc<ServerDeps>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    permits: Arc<Semaphore>,
}

impl OsAiServer {
    /// Create a server with every RPC method registered.
    pub fn new(config: ServerConfig, deps: ServerDeps) -> Self {
        let mut registry = MethodRegistry::new();
        register_all(&mut registry);
        let permits = Arc::new(Semaphore::new(config.max_connections));
        Self {
            config,
            registry: Arc::new(registry),
            deps: Arc::new(deps),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            permits,
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            deps: self.deps.clone(),
            registry: self.registry.clone(),
            config: self.config.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            permits: self.permits.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(ws_handler))
            .with_state(state)
    }

    /// Bind and serve in the background until shutdown.
    ///
    /// Returns the bound address (useful with port `0`) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(%addr, "OS-AI server listening");
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server error");
            }
        });
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the method registry.
    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Get the shared collaborators.
    pub fn deps(&self) -> &Arc<ServerDeps> {
        &self.deps
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.connection_count(),
        state.deps.jobs.len(),
    ))
}

/// GET /ws
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let Ok(permit) = state.permits.clone().try_acquire_owned() else {
        warn!(max = state.config.max_connections, "connection limit reached");
        return (StatusCode::SERVICE_UNAVAILABLE, "too many connections").into_response();
    };

    let fallback = state.deps.fallback_credential.as_ref().map(Credential::expose);
    let credential = resolve_credential(query.anthropic_api_key.as_deref(), fallback);

    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, credential, permit))
}

async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    credential: Option<Credential>,
    _permit: OwnedSemaphorePermit,
) {
    let conn_id = uuid::Uuid::now_v7().to_string();
    run_ws_session(
        socket,
        conn_id,
        state.registry,
        state.deps,
        credential,
        state.config,
        state.shutdown.child_token(),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::context::test_helpers::server_deps;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_server() -> OsAiServer {
        OsAiServer::new(ServerConfig::default(), server_deps())
    }

    #[test]
    fn registers_all_methods() {
        let server = make_server();
        assert_eq!(
            server.registry().methods(),
            vec!["agent.cancel", "agent.run", "session.create"]
        );
    }

    #[test]
    fn shutdown_coordinator_accessible() {
        let server = make_server();
        assert!(!server.shutdown().is_shutting_down());
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let server = make_server();
        let app = server.router();

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 0);
        assert_eq!(parsed["activeJobs"], 0);
    }

    #[tokio::test]
    async fn health_counts_registered_jobs() {
        let server = make_server();
        server.deps().jobs.register(
            osai_core::JobId::new(),
            tokio_util::sync::CancellationToken::new(),
        );

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["activeJobs"], 1);
    }

    #[tokio::test]
    async fn ws_without_upgrade_is_rejected() {
        let server = make_server();
        let req = Request::builder().uri("/ws").body(Body::empty()).unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = make_server();
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_on_ephemeral_port() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let server = OsAiServer::new(config, server_deps());
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
