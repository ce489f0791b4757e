//! Public listener and dispatch engine.
//!
//! - `connection`: per-connection handle with the forced reset capability
//! - `handler`: behavior evaluation for a single request
//! - `server`: accept loop

mod connection;
mod handler;
mod server;

pub use connection::{ConnectionHandle, TransportError};
pub use handler::{handle_request, json_response};
pub use server::PublicServer;
