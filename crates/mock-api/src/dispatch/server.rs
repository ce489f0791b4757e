//! Public listener.

use super::connection::ConnectionHandle;
use super::handler::handle_request;
use crate::control::MockState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Serves configured responses on any method and path
pub struct PublicServer {
    listener: TcpListener,
    state: Arc<MockState>,
}

impl PublicServer {
    pub async fn bind(addr: SocketAddr, state: Arc<MockState>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!("Mock API listening on http://{}", self.local_addr()?);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Public accept error: {}", e);
                    continue;
                }
            };

            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                let connection = Arc::new(ConnectionHandle::attach(&stream, peer));
                let io = TokioIo::new(stream);
                let handle = Arc::clone(&connection);
                let service = service_fn(move |req| {
                    handle_request(req, Arc::clone(&state), Arc::clone(&handle))
                });

                let conn = http1::Builder::new().serve_connection(io, service);
                tokio::select! {
                    result = conn => {
                        if let Err(e) = result {
                            debug!(%peer, "Public connection error: {}", e);
                        }
                    }
                    _ = connection.terminated() => {
                        debug!(%peer, "Connection reset");
                    }
                }
            });
        }
    }
}
