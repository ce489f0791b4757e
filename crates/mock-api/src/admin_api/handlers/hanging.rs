//! Hanging request handlers.

use crate::admin_api::types::{
    collect_body, control_error_response, error_response, json_response, ResolveHangingRequest,
};
use crate::control::{ControlError, MockState};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{error, warn};

/// GET /api/hanging-requests - Parked request summaries
pub fn handle_list(state: Arc<MockState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.list_hanging_requests())
}

/// POST /api/hanging-request - Respond to or drop a parked request
pub async fn handle_resolve(
    req: Request<Incoming>,
    state: Arc<MockState>,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let resolve: ResolveHangingRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid resolution JSON: {e}"),
            )
        }
    };

    match state.resolve_hanging_request(&resolve.id, resolve.action) {
        Ok(result) => json_response(StatusCode::OK, &result),
        Err(e @ ControlError::Transport(_)) => {
            error!(id = %resolve.id, action = %resolve.action, "Resolution failed: {}", e);
            control_error_response(&e)
        }
        Err(e) => {
            warn!(id = %resolve.id, action = %resolve.action, "Resolution refused: {}", e);
            control_error_response(&e)
        }
    }
}
