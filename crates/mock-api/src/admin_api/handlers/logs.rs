//! Request log handlers.

use crate::admin_api::types::json_response;
use crate::control::MockState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// GET /api/logs - Log snapshot, oldest first
pub fn handle_list(state: Arc<MockState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.list_logs())
}

/// DELETE /api/logs - Clear the log
pub fn handle_clear(state: Arc<MockState>) -> Response<Full<Bytes>> {
    let removed = state.clear_logs();
    json_response(StatusCode::OK, &serde_json::json!({ "cleared": removed }))
}
