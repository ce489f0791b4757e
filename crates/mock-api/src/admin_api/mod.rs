//! Administrative HTTP API.
//!
//! Configures path responses, exposes the request log and parked requests,
//! resolves parked requests, and serves the dashboard assets and metrics.

mod handlers;
mod router;
mod server;
mod types;

pub use handlers::assets::StaticAssets;
pub use server::AdminApiServer;
pub use types::{ResolveHangingRequest, UpsertResponseRequest};
