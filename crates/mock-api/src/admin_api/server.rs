//! Admin API server.

use crate::admin_api::handlers::assets::StaticAssets;
use crate::admin_api::router::route_request;
use crate::control::MockState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Administrative listener sharing state with the public listener
pub struct AdminApiServer {
    listener: TcpListener,
    state: Arc<MockState>,
    assets: Arc<StaticAssets>,
}

impl AdminApiServer {
    pub async fn bind(
        addr: SocketAddr,
        state: Arc<MockState>,
        static_dir: impl Into<PathBuf>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state,
            assets: Arc::new(StaticAssets::new(static_dir)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the admin API server
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!(
            static_dir = %self.assets.root().display(),
            "Admin API listening on http://{}",
            self.local_addr()?
        );

        loop {
            let (stream, _) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);
            let assets = Arc::clone(&self.assets);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    let assets = Arc::clone(&assets);
                    async move { route_request(req, state, assets).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Admin API connection error: {}", e);
                }
            });
        }
    }
}
