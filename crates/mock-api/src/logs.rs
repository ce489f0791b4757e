//! Request log store.
//!
//! Append-only record of every request the public listener answered,
//! rejected or dropped, in the order the appends happened.

use crate::capture::{CapturedRequest, HeaderMultiMap};
use crate::registry::PathResponse;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Status recorded for connections reset without a response
pub const RESET_STATUS: u16 = 0;
/// Body recorded for rejected requests
pub const REJECTED_BODY: &str = "Connection rejected";
/// Body recorded for dropped hanging requests
pub const DROPPED_BODY: &str = "Connection dropped";

/// One completed, rejected or dropped request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub headers: HeaderMultiMap,
    pub query_params: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "directIP")]
    pub direct_ip: String,
    #[serde(rename = "forwardedIP")]
    pub forwarded_ip: String,
    /// Body actually sent, or a sentinel for reset connections
    pub response: String,
    /// Status actually sent, [`RESET_STATUS`] for reset connections
    pub status_code: u16,
}

impl RequestLogEntry {
    /// Entry for a request answered with `response`
    pub fn answered(request: &CapturedRequest, response: &PathResponse) -> Self {
        Self::from_capture(request, response.body.clone(), response.status_code)
    }

    /// Entry for a request whose connection was reset
    pub fn reset(request: &CapturedRequest, sentinel: &str) -> Self {
        Self::from_capture(request, sentinel.to_string(), RESET_STATUS)
    }

    fn from_capture(request: &CapturedRequest, response: String, status_code: u16) -> Self {
        Self {
            timestamp: request.timestamp,
            method: request.method.clone(),
            path: request.path.clone(),
            headers: request.headers.clone(),
            query_params: request.query_params.clone(),
            body: request.body.clone(),
            direct_ip: request.direct_ip.clone(),
            forwarded_ip: request.forwarded_ip.clone(),
            response,
            status_code,
        }
    }
}

/// Concurrent append-only log, optionally capped (oldest evicted first)
pub struct RequestLogStore {
    entries: RwLock<VecDeque<RequestLogEntry>>,
    capacity: Option<usize>,
}

impl RequestLogStore {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.filter(|c| *c > 0),
        }
    }

    pub fn append(&self, entry: RequestLogEntry) {
        let mut entries = self.entries.write();
        if let Some(capacity) = self.capacity {
            while entries.len() >= capacity {
                entries.pop_front();
            }
        }
        entries.push_back(entry);
    }

    /// Entries in insertion order, oldest first
    pub fn snapshot(&self) -> Vec<RequestLogEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Remove every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for RequestLogStore {
    fn default() -> Self {
        Self::new()
    }
}
