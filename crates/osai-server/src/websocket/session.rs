//! WebSocket session lifecycle. Handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use osai_runtime::Credential;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::ClientConnection;
use super::handler::handle_message;
use super::notify::JobMessage;
use crate::config::ServerConfig;
use crate::rpc::context::{RpcContext, ServerDeps};
use crate::rpc::registry::MethodRegistry;

/// Outbound frames buffered ahead of the socket writer.
const OUTBOUND_BUFFER: usize = 256;

/// Run a WebSocket session for a connected client.
///
/// Requests are handled inline on the receive loop; jobs they start run on
/// their own tasks and report back over a bounded channel that the same
/// loop drains. Closing the connection cancels `conn_token`, which every
/// job token descends from.
#[instrument(skip_all, fields(conn_id = %conn_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    conn_id: String,
    registry: Arc<MethodRegistry>,
    deps: Arc<ServerDeps>,
    credential: Option<Credential>,
    config: ServerConfig,
    conn_token: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
    let connection = Arc::new(ClientConnection::new(conn_id.clone(), send_tx));
    let (job_tx, mut job_rx) = mpsc::channel::<JobMessage>(config.event_buffer);

    info!(has_credential = credential.is_some(), "client connected");

    let ctx = RpcContext {
        deps,
        conn_id: conn_id.clone(),
        credential,
        job_tx,
        cancel: conn_token.clone(),
    };

    // Outbound forwarder with periodic Ping frames.
    let ping_every = Duration::from_secs(config.heartbeat_interval_secs.max(1));
    let pong_timeout = Duration::from_secs(config.heartbeat_timeout_secs);
    let outbound_conn = connection.clone();
    let outbound_token = conn_token.clone();
    let outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(ping_every);
        // Skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    let Some(text) = msg else { break };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if !outbound_conn.check_alive() && outbound_conn.last_pong_elapsed() > pong_timeout {
                        warn!("client unresponsive for {:?}, disconnecting", pong_timeout);
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        // Unblocks the receive loop when the writer dies first.
        outbound_token.cancel();
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(t))) => t.to_string(),
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "ignoring binary frame");
                        connection.mark_alive();
                        continue;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        connection.mark_alive();
                        continue;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("client sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "websocket receive error");
                        break;
                    }
                    None => break,
                };
                connection.mark_alive();

                let result = handle_message(&text, &registry, &ctx).await;
                if !connection.send(result.response_json).await {
                    debug!("writer gone, dropping response");
                    break;
                }
            }
            Some(message) = job_rx.recv() => {
                if message.is_final() {
                    debug!(job_id = %message.job_id, "forwarding final event");
                }
                if !connection.send_json(&message.to_notification()).await {
                    debug!("writer gone, dropping job event");
                    break;
                }
            }
            () = conn_token.cancelled() => {
                debug!("connection token cancelled");
                break;
            }
        }
    }

    conn_token.cancel();
    outbound.abort();
    info!(age_secs = connection.age().as_secs_f64(), "client disconnected");
}
