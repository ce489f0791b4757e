//! Per-connection control handle.
//!
//! hyper owns the accepted `TcpStream` once a connection is being served, so
//! the handle keeps a duplicate of the socket descriptor. A forced reset sets
//! `SO_LINGER` to zero on the shared socket and cancels the connection task;
//! when the task drops hyper's stream and the last descriptor closes, the
//! kernel sends RST instead of FIN and no response bytes are written.

use socket2::{SockRef, Socket};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, warn};

/// Errors raised when forcing a connection closed
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection does not support forced termination")]
    Unsupported,
    #[error("failed to reset connection: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the transport connection behind a request
pub struct ConnectionHandle {
    peer: SocketAddr,
    socket: Option<Socket>,
    terminate: CancellationToken,
}

impl ConnectionHandle {
    /// Attach to an accepted stream. Falls back to a detached handle if the
    /// descriptor cannot be duplicated.
    pub fn attach(stream: &TcpStream, peer: SocketAddr) -> Self {
        match SockRef::from(stream).try_clone() {
            Ok(socket) => Self {
                peer,
                socket: Some(socket),
                terminate: CancellationToken::new(),
            },
            Err(e) => {
                warn!(%peer, "Cannot duplicate socket, forced resets unavailable: {}", e);
                Self::detached(peer)
            }
        }
    }

    /// Handle without low-level socket access; resets fail with
    /// [`TransportError::Unsupported`].
    pub fn detached(peer: SocketAddr) -> Self {
        Self {
            peer,
            socket: None,
            terminate: CancellationToken::new(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn supports_reset(&self) -> bool {
        self.socket.is_some()
    }

    /// Abort the connection with a TCP reset, writing nothing further
    pub fn reset(&self) -> Result<(), TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::Unsupported)?;
        socket.set_linger(Some(Duration::ZERO))?;
        self.terminate.cancel();
        debug!(peer = %self.peer, "Connection marked for reset");
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminate.is_cancelled()
    }

    /// Resolves once [`reset`](Self::reset) has been called
    pub fn terminated(&self) -> WaitForCancellationFuture<'_> {
        self.terminate.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_detached_handle_cannot_reset() {
        let handle = ConnectionHandle::detached("127.0.0.1:9".parse().unwrap());
        assert!(!handle.supports_reset());
        assert!(matches!(handle.reset(), Err(TransportError::Unsupported)));
        assert!(!handle.is_terminated());
    }

    #[tokio::test]
    async fn test_attached_handle_resets() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        let handle = ConnectionHandle::attach(&stream, peer);
        assert!(handle.supports_reset());
        assert_eq!(handle.peer(), peer);

        handle.reset().unwrap();
        assert!(handle.is_terminated());
        // Already cancelled, completes immediately
        handle.terminated().await;
    }
}
