//! Hanging request types.

use crate::capture::HeaderMultiMap;
use crate::dispatch::TransportError;
use crate::registry::PathResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of a parked request (no transport handle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HangingRequest {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub headers: HeaderMultiMap,
    #[serde(rename = "directIP")]
    pub direct_ip: String,
}

/// Operator action for a parked request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    /// Answer with the path's current configuration
    Respond,
    /// Reset the connection
    Drop,
}

impl ResolveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveAction::Respond => "respond",
            ResolveAction::Drop => "drop",
        }
    }
}

impl fmt::Display for ResolveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion signal delivered to the suspended handling task
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Respond(PathResponse),
    Dropped,
}

/// Outcome reported to the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub id: String,
    pub action: ResolveAction,
    /// Status delivered to the client, 0 when dropped
    pub status_code: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("hanging request {0} not found")]
    NotFound(String),
    #[error("hanging request {0} already handled")]
    AlreadyResolved(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
