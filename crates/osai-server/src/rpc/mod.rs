//! JSON-RPC 2.0 types, errors, handler registry and method handlers.

pub mod context;
pub mod errors;
pub mod handlers;
pub mod registry;
pub mod types;
