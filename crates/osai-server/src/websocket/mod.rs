//! WebSocket connection state, message dispatch, job event relay, and the
//! per-connection session loop.

pub mod connection;
pub mod handler;
pub mod notify;
pub mod session;
