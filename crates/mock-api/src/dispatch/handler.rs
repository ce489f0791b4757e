//! Dispatch engine for the public listener.
//!
//! Behaviors are evaluated in a fixed order: reject, timeout, hang-up,
//! delay, then the normal response. No store lock is held across any wait.

use super::connection::ConnectionHandle;
use crate::capture::CapturedRequest;
use crate::control::MockState;
use crate::hanging::Resolution;
use crate::logs::{RequestLogEntry, REJECTED_BODY, RESET_STATUS};
use crate::metrics;
use crate::registry::PathResponse;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info, warn};

const RESET_UNAVAILABLE_BODY: &str = r#"{"error": "connection reset not supported"}"#;
const UNRESOLVED_BODY: &str = r#"{"error": "hanging request discarded"}"#;

/// Handle one request on the public listener
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<MockState>,
    connection: Arc<ConnectionHandle>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let request = capture(req, &connection).await;
    let config = state.responses.resolve(&request.path);
    let advanced = &config.advanced;

    debug!(
        method = %request.method,
        path = %request.path,
        peer = %connection.peer(),
        "Public request received"
    );

    if advanced.reject_request {
        metrics::record_behavior("reject");
        match connection.reset() {
            Ok(()) => {
                info!(path = %request.path, "Request rejected with connection reset");
                state
                    .logs
                    .append(RequestLogEntry::reset(&request, REJECTED_BODY));
                metrics::record_request(&request.method, RESET_STATUS);
                // The connection task drops the socket once reset is signalled
                return std::future::pending().await;
            }
            Err(e) => {
                warn!(path = %request.path, "Cannot reject request: {}", e);
                let failure = PathResponse::with_status(500, RESET_UNAVAILABLE_BODY);
                return Ok(finish(&state, &request, &failure));
            }
        }
    }

    if let Some(timeout) = advanced.timeout_duration() {
        metrics::record_behavior("timeout");
        debug!(path = %request.path, ?timeout, "Applying timeout");
        tokio::time::sleep(timeout).await;
    }

    if advanced.hang_up {
        metrics::record_behavior("hang");
        let method = request.method.clone();
        let mut ticket = state.hanging.park(request.clone(), Arc::clone(&connection));
        info!(id = %ticket.id(), path = %request.path, "Request hanging until resolved");

        return match ticket.wait().await {
            Some(Resolution::Respond(response)) => {
                metrics::record_behavior("respond");
                metrics::record_request(&method, response.status_code);
                Ok(json_response(&response))
            }
            Some(Resolution::Dropped) => {
                metrics::record_request(&method, RESET_STATUS);
                std::future::pending().await
            }
            None => {
                warn!(id = %ticket.id(), "Hanging request discarded without resolution");
                let unresolved = PathResponse::with_status(503, UNRESOLVED_BODY);
                Ok(finish(&state, &request, &unresolved))
            }
        };
    }

    if let Some(delay) = advanced.delay_duration() {
        metrics::record_behavior("delay");
        debug!(path = %request.path, ?delay, "Applying delay");
        tokio::time::sleep(delay).await;
    }

    Ok(finish(&state, &request, &config))
}

/// Log and build the normal response for a request
fn finish(
    state: &MockState,
    request: &CapturedRequest,
    response: &PathResponse,
) -> Response<Full<Bytes>> {
    state.logs.append(RequestLogEntry::answered(request, response));
    metrics::record_request(&request.method, response.status_code);
    json_response(response)
}

async fn capture(req: Request<Incoming>, connection: &ConnectionHandle) -> CapturedRequest {
    let method = req.method().to_string();
    let uri = req.uri().clone();
    let headers = req.headers().clone();

    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            String::new()
        }
    };

    CapturedRequest::new(
        &method,
        uri.path(),
        uri.query(),
        &headers,
        body,
        connection.peer().ip(),
    )
}

/// Configured body verbatim with a JSON content type
pub fn json_response(response: &PathResponse) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut resp = Response::new(Full::new(Bytes::from(response.body.clone())));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    resp
}
