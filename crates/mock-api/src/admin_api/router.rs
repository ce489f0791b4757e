//! Route dispatch for the admin API.

use crate::admin_api::handlers::assets::StaticAssets;
use crate::admin_api::handlers::{hanging, logs, responses, system};
use crate::admin_api::types::{method_not_allowed, not_found};
use crate::control::MockState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    state: Arc<MockState>,
    assets: Arc<StaticAssets>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|s| s.to_string());

    debug!("Admin API: {} {}", method, path);

    let response = route_by_path(&method, &path, query.as_deref(), req, state, assets).await;
    Ok(response)
}

async fn route_by_path(
    method: &Method,
    path: &str,
    query: Option<&str>,
    req: Request<Incoming>,
    state: Arc<MockState>,
    assets: Arc<StaticAssets>,
) -> Response<Full<Bytes>> {
    match path {
        "/api/responses" => match *method {
            Method::GET => responses::handle_list(state),
            _ => method_not_allowed(),
        },
        "/api/response" => match *method {
            Method::POST => responses::handle_upsert(req, state).await,
            Method::DELETE => responses::handle_delete(query, state),
            _ => method_not_allowed(),
        },
        "/api/logs" => match *method {
            Method::GET => logs::handle_list(state),
            Method::DELETE => logs::handle_clear(state),
            _ => method_not_allowed(),
        },
        "/api/hanging-requests" => match *method {
            Method::GET => hanging::handle_list(state),
            _ => method_not_allowed(),
        },
        "/api/hanging-request" => match *method {
            Method::POST => hanging::handle_resolve(req, state).await,
            _ => method_not_allowed(),
        },
        "/health" => match *method {
            Method::GET => system::handle_health(),
            _ => method_not_allowed(),
        },
        "/metrics" => match *method {
            Method::GET => system::handle_metrics(),
            _ => method_not_allowed(),
        },
        "/" | "/index.html" if *method == Method::GET => assets.index().await,
        _ => match path.strip_prefix("/static/") {
            Some(relative) if *method == Method::GET => assets.serve(relative).await,
            _ => not_found(),
        },
    }
}
