//! Request bodies and JSON response helpers for the admin API.

use crate::control::ControlError;
use crate::hanging::ResolveAction;
use crate::registry::{AdvancedBehavior, PathResponse};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// POST /api/response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertResponseRequest {
    pub path: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub advanced: AdvancedBehavior,
}

impl UpsertResponseRequest {
    /// Split into the target path and the configuration to store.
    /// A missing or zero status becomes 200.
    pub fn into_parts(self) -> (String, PathResponse) {
        let status_code = match self.status_code {
            None | Some(0) => 200,
            Some(code) => code,
        };
        (
            self.path,
            PathResponse {
                status_code,
                body: self.response,
                advanced: self.advanced,
            },
        )
    }
}

/// POST /api/hanging-request body
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveHangingRequest {
    pub id: String,
    pub action: ResolveAction,
}

/// Query value for `name`, percent-decoded
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != name {
            return None;
        }
        let value = value.replace('+', " ");
        Some(
            urlencoding::decode(&value)
                .map(|v| v.into_owned())
                .unwrap_or(value),
        )
    })
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers, falling back to a bare response if
/// the builder rejects them.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

pub fn method_not_allowed() -> Response<Full<Bytes>> {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Status for a control error
pub fn control_status(err: &ControlError) -> StatusCode {
    match err {
        ControlError::Validation(_) | ControlError::InvalidOperation(_) => {
            StatusCode::BAD_REQUEST
        }
        ControlError::NotFound(_) => StatusCode::NOT_FOUND,
        ControlError::AlreadyResolved(_) => StatusCode::CONFLICT,
        ControlError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn control_error_response(err: &ControlError) -> Response<Full<Bytes>> {
    error_response(control_status(err), &err.to_string())
}

/// Collect request body into bytes
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
