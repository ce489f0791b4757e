//! Shared mock state and the control operations used by the admin API.
//!
//! The response registry, request log and hanging request registry are each
//! locked independently; every operation here delegates to exactly one of
//! them, except `resolve_hanging_request`, which takes them one at a time.

use crate::dispatch::TransportError;
use crate::hanging::{
    HangingRequest, HangingRequestRegistry, ResolutionResult, ResolveAction, ResolveError,
};
use crate::logs::{RequestLogEntry, RequestLogStore};
use crate::registry::{PathResponse, RegistryError, ResponseRegistry};
use std::collections::BTreeMap;
use tracing::info;

/// Errors surfaced to the administrative boundary
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyResolved(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<RegistryError> for ControlError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidOperation(msg) => ControlError::InvalidOperation(msg),
        }
    }
}

impl From<ResolveError> for ControlError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(_) => ControlError::NotFound(err.to_string()),
            ResolveError::AlreadyResolved(_) => ControlError::AlreadyResolved(err.to_string()),
            ResolveError::Transport(e) => ControlError::Transport(e),
        }
    }
}

/// State shared by the public and admin listeners
pub struct MockState {
    pub responses: ResponseRegistry,
    pub logs: RequestLogStore,
    pub hanging: HangingRequestRegistry,
}

impl MockState {
    pub fn new(default_response: PathResponse) -> Self {
        Self::with_log_capacity(default_response, None)
    }

    pub fn with_log_capacity(default_response: PathResponse, capacity: Option<usize>) -> Self {
        Self {
            responses: ResponseRegistry::new(default_response),
            logs: RequestLogStore::with_capacity(capacity),
            hanging: HangingRequestRegistry::new(),
        }
    }

    /// Validate and store `response` for `path`
    pub fn upsert_response(
        &self,
        path: &str,
        response: PathResponse,
    ) -> Result<PathResponse, ControlError> {
        validate_path(path)?;
        response.validate().map_err(ControlError::Validation)?;
        self.responses.upsert(path, response.clone());
        Ok(response)
    }

    pub fn delete_response(&self, path: &str) -> Result<(), ControlError> {
        if path.is_empty() {
            return Err(ControlError::Validation(
                "path parameter is required".to_string(),
            ));
        }
        self.responses.delete(path)?;
        Ok(())
    }

    pub fn list_responses(&self) -> BTreeMap<String, PathResponse> {
        self.responses.snapshot()
    }

    pub fn list_logs(&self) -> Vec<RequestLogEntry> {
        self.logs.snapshot()
    }

    pub fn clear_logs(&self) -> usize {
        let removed = self.logs.clear();
        info!(removed, "Request logs cleared");
        removed
    }

    pub fn list_hanging_requests(&self) -> Vec<HangingRequest> {
        self.hanging.list()
    }

    pub fn resolve_hanging_request(
        &self,
        id: &str,
        action: ResolveAction,
    ) -> Result<ResolutionResult, ControlError> {
        if id.is_empty() {
            return Err(ControlError::Validation("id is required".to_string()));
        }
        Ok(self
            .hanging
            .resolve(id, action, &self.responses, &self.logs)?)
    }
}

fn validate_path(path: &str) -> Result<(), ControlError> {
    if path.is_empty() {
        return Err(ControlError::Validation("path is required".to_string()));
    }
    if !path.starts_with('/') {
        return Err(ControlError::Validation(format!(
            "path must start with '/', got '{path}'"
        )));
    }
    Ok(())
}
