//! Dashboard asset serving.

use crate::admin_api::types::{build_response_with_headers, not_found};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Files served from the dashboard directory
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// GET / - Dashboard page
    pub async fn index(&self) -> Response<Full<Bytes>> {
        self.serve("index.html").await
    }

    /// GET /static/<relative> - File under the asset root
    pub async fn serve(&self, relative: &str) -> Response<Full<Bytes>> {
        let Some(path) = self.resolve(relative) else {
            debug!(relative, "Refused asset path");
            return not_found();
        };

        match tokio::fs::read(&path).await {
            Ok(contents) => build_response_with_headers(
                StatusCode::OK,
                [("Content-Type", content_type(&path))],
                contents,
            ),
            Err(e) => {
                debug!(path = %path.display(), "Asset not served: {}", e);
                not_found()
            }
        }
    }

    /// Join `relative` onto the root, refusing anything but plain file names
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative.as_os_str().is_empty() {
            return None;
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// Content type from the file extension
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
