//! Response configuration handlers.

use crate::admin_api::types::{
    collect_body, control_error_response, error_response, json_response, query_param,
    UpsertResponseRequest,
};
use crate::control::MockState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::warn;

/// GET /api/responses - Registry snapshot including the default path
pub fn handle_list(state: Arc<MockState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.list_responses())
}

/// POST /api/response - Create or replace a path's response
pub async fn handle_upsert(
    req: Request<Incoming>,
    state: Arc<MockState>,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let upsert: UpsertResponseRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejected response configuration: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid response JSON: {e}"),
            );
        }
    };

    let (path, response) = upsert.into_parts();
    match state.upsert_response(&path, response) {
        Ok(stored) => json_response(StatusCode::OK, &stored),
        Err(e) => {
            warn!(path = %path, "Rejected response configuration: {}", e);
            control_error_response(&e)
        }
    }
}

/// DELETE /api/response?path=P - Remove a path's response
pub fn handle_delete(query: Option<&str>, state: Arc<MockState>) -> Response<Full<Bytes>> {
    let path = query_param(query, "path").unwrap_or_default();
    match state.delete_response(&path) {
        Ok(()) => json_response(StatusCode::OK, &serde_json::json!({ "deleted": path })),
        Err(e) => {
            warn!(path = %path, "Rejected response deletion: {}", e);
            control_error_response(&e)
        }
    }
}
