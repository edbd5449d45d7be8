//! # osai-server
//!
//! Axum HTTP + `WebSocket` front end for the agent runtime.
//!
//! - `/ws`: one JSON-RPC 2.0 session per connection; the credential comes
//!   from the `anthropic_api_key` query parameter or the process fallback
//! - Methods: `session.create`, `agent.run`, `agent.cancel`
//! - Job events are relayed as `event.*` notifications over a bounded channel
//! - `/health`: uptime, connection and job counters
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod rpc;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use rpc::context::{RpcContext, ServerDeps};
pub use server::OsAiServer;
pub use shutdown::ShutdownCoordinator;
