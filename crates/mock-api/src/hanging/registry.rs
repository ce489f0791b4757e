//! HangingRequestRegistry - requests suspended until an operator resolves them.

use super::types::{HangingRequest, Resolution, ResolutionResult, ResolveAction, ResolveError};
use crate::capture::CapturedRequest;
use crate::dispatch::ConnectionHandle;
use crate::logs::{RequestLogEntry, RequestLogStore, DROPPED_BODY, RESET_STATUS};
use crate::metrics;
use crate::registry::ResponseRegistry;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

struct ParkedRequest {
    summary: HangingRequest,
    request: CapturedRequest,
    connection: Arc<ConnectionHandle>,
    completion: oneshot::Sender<Resolution>,
}

/// Parked requests keyed by generated id
pub struct HangingRequestRegistry {
    parked: RwLock<HashMap<String, ParkedRequest>>,
}

impl HangingRequestRegistry {
    pub fn new() -> Self {
        Self {
            parked: RwLock::new(HashMap::new()),
        }
    }

    /// Park a request. The returned ticket receives the resolution and
    /// removes the entry if it is dropped first (client went away).
    pub fn park(
        &self,
        request: CapturedRequest,
        connection: Arc<ConnectionHandle>,
    ) -> ParkedTicket<'_> {
        let id = uuid::Uuid::new_v4().to_string();
        let (completion, receiver) = oneshot::channel();
        let summary = HangingRequest {
            id: id.clone(),
            timestamp: request.timestamp,
            method: request.method.clone(),
            path: request.path.clone(),
            headers: request.headers.clone(),
            direct_ip: request.direct_ip.clone(),
        };

        self.parked.write().insert(
            id.clone(),
            ParkedRequest {
                summary,
                request,
                connection,
                completion,
            },
        );
        metrics::HANGING_REQUESTS.inc();
        info!(id = %id, "Request parked");

        ParkedTicket {
            id,
            registry: self,
            receiver,
        }
    }

    /// Summaries of parked requests, oldest first
    pub fn list(&self) -> Vec<HangingRequest> {
        let mut requests: Vec<HangingRequest> = self
            .parked
            .read()
            .values()
            .map(|parked| parked.summary.clone())
            .collect();
        requests.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        requests
    }

    pub fn count(&self) -> usize {
        self.parked.read().len()
    }

    /// Resolve a parked request exactly once.
    ///
    /// The entry leaves the registry before the completion signal fires, so a
    /// concurrent duplicate sees `NotFound`. `respond` looks the path up again
    /// at resolution time.
    pub fn resolve(
        &self,
        id: &str,
        action: ResolveAction,
        responses: &ResponseRegistry,
        logs: &RequestLogStore,
    ) -> Result<ResolutionResult, ResolveError> {
        let ParkedRequest {
            request,
            connection,
            completion,
            ..
        } = self.claim(id, action)?;

        let status_code = match action {
            ResolveAction::Respond => {
                // Success means the handling task took the response; the
                // client may still vanish before it reaches the wire.
                let response = responses.resolve(&request.path);
                let status_code = response.status_code;
                let entry = RequestLogEntry::answered(&request, &response);
                if completion.send(Resolution::Respond(response)).is_err() {
                    warn!(id, "Client disconnected before the response was delivered");
                    return Err(ResolveError::AlreadyResolved(id.to_string()));
                }
                logs.append(entry);
                status_code
            }
            ResolveAction::Drop => {
                debug!(id, peer = %connection.peer(), "Connection reset");
                let _ = completion.send(Resolution::Dropped);
                logs.append(RequestLogEntry::reset(&request, DROPPED_BODY));
                metrics::record_behavior("drop");
                RESET_STATUS
            }
        };

        info!(id, action = %action, status_code, "Hanging request resolved");
        Ok(ResolutionResult {
            id: id.to_string(),
            action,
            status_code,
        })
    }

    /// Remove the entry for resolution. A drop resets the connection while
    /// the entry is still held, so a failed reset leaves the request parked.
    fn claim(&self, id: &str, action: ResolveAction) -> Result<ParkedRequest, ResolveError> {
        let mut parked = self.parked.write();
        let Entry::Occupied(entry) = parked.entry(id.to_string()) else {
            return Err(ResolveError::NotFound(id.to_string()));
        };

        // Receiver gone: the handling task has already finished
        if entry.get().completion.is_closed() {
            entry.remove();
            metrics::HANGING_REQUESTS.dec();
            return Err(ResolveError::AlreadyResolved(id.to_string()));
        }

        if action == ResolveAction::Drop {
            entry.get().connection.reset()?;
        }

        metrics::HANGING_REQUESTS.dec();
        Ok(entry.remove())
    }

    fn abandon(&self, id: &str) {
        if self.parked.write().remove(id).is_some() {
            metrics::HANGING_REQUESTS.dec();
            debug!(id, "Parked request abandoned by client");
        }
    }
}

impl Default for HangingRequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handling task's side of a parked request
pub struct ParkedTicket<'a> {
    id: String,
    registry: &'a HangingRequestRegistry,
    receiver: oneshot::Receiver<Resolution>,
}

impl ParkedTicket<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the operator. `None` if the entry was discarded unresolved.
    pub async fn wait(&mut self) -> Option<Resolution> {
        (&mut self.receiver).await.ok()
    }
}

impl Drop for ParkedTicket<'_> {
    fn drop(&mut self) {
        self.registry.abandon(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TransportError;
    use crate::registry::PathResponse;
    use hyper::HeaderMap;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};

    fn captured(path: &str) -> CapturedRequest {
        CapturedRequest::new(
            "GET",
            path,
            Some("x=1"),
            &HeaderMap::new(),
            "hello".to_string(),
            "127.0.0.1".parse().unwrap(),
        )
    }

    fn detached() -> Arc<ConnectionHandle> {
        Arc::new(ConnectionHandle::detached("127.0.0.1:40000".parse().unwrap()))
    }

    fn stores() -> (ResponseRegistry, RequestLogStore) {
        (
            ResponseRegistry::new(PathResponse::ok("default")),
            RequestLogStore::new(),
        )
    }

    #[tokio::test]
    async fn test_park_and_list() {
        let registry = HangingRequestRegistry::new();
        let ticket = registry.park(captured("/park"), detached());

        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ticket.id());
        assert_eq!(listed[0].path, "/park");
        assert_eq!(listed[0].direct_ip, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_respond_uses_configuration_at_resolution_time() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        responses.upsert("/park", PathResponse::with_status(200, "at park time"));

        let mut ticket = registry.park(captured("/park"), detached());
        let id = ticket.id().to_string();

        responses.upsert("/park", PathResponse::with_status(202, "at resolve time"));
        let result = registry
            .resolve(&id, ResolveAction::Respond, &responses, &logs)
            .unwrap();
        assert_eq!(result.status_code, 202);

        match ticket.wait().await {
            Some(Resolution::Respond(response)) => assert_eq!(response.body, "at resolve time"),
            other => panic!("unexpected resolution: {other:?}"),
        }

        let entries = logs.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status_code, 202);
        assert_eq!(entries[0].response, "at resolve time");
        assert_eq!(entries[0].body, "hello");
        assert_eq!(entries[0].query_params["x"], "1");
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let result = registry.resolve("missing", ResolveAction::Respond, &responses, &logs);
        assert!(matches!(result, Err(ResolveError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_second_resolution_is_rejected() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let _ticket = registry.park(captured("/park"), detached());
        let id = registry.list()[0].id.clone();

        assert!(registry
            .resolve(&id, ResolveAction::Respond, &responses, &logs)
            .is_ok());
        let second = registry.resolve(&id, ResolveAction::Respond, &responses, &logs);
        assert!(matches!(
            second,
            Err(ResolveError::NotFound(_)) | Err(ResolveError::AlreadyResolved(_))
        ));
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_succeed_once() {
        let registry = Arc::new(HangingRequestRegistry::new());
        let responses = Arc::new(ResponseRegistry::new(PathResponse::ok("default")));
        let logs = Arc::new(RequestLogStore::new());

        let ticket = registry.park(captured("/"), detached());
        let id = ticket.id().to_string();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let responses = Arc::clone(&responses);
                let logs = Arc::clone(&logs);
                let id = id.clone();
                std::thread::spawn(move || {
                    registry.resolve(&id, ResolveAction::Respond, &responses, &logs)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().all(|r| matches!(
            r,
            Ok(_) | Err(ResolveError::NotFound(_)) | Err(ResolveError::AlreadyResolved(_))
        )));
        assert_eq!(logs.len(), 1);
        drop(ticket);
    }

    #[tokio::test]
    async fn test_drop_without_socket_access_keeps_request_parked() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let _ticket = registry.park(captured("/park"), detached());
        let id = registry.list()[0].id.clone();

        let result = registry.resolve(&id, ResolveAction::Drop, &responses, &logs);
        assert!(matches!(
            result,
            Err(ResolveError::Transport(TransportError::Unsupported))
        ));
        assert_eq!(registry.count(), 1);
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_failed_drop_leaves_ticket_waiting() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let mut ticket = registry.park(captured("/park"), detached());
        let id = ticket.id().to_string();

        assert!(registry
            .resolve(&id, ResolveAction::Drop, &responses, &logs)
            .is_err());
        let waited = tokio::time::timeout(Duration::from_millis(50), ticket.wait()).await;
        assert!(waited.is_err(), "ticket resolved by a failed drop");
        assert_eq!(registry.count(), 1);

        // Still resolvable afterwards
        registry
            .resolve(&id, ResolveAction::Respond, &responses, &logs)
            .unwrap();
        assert!(matches!(ticket.wait().await, Some(Resolution::Respond(_))));
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn test_respond_after_client_left_is_rejected() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let mut ticket = registry.park(captured("/park"), detached());
        let id = ticket.id().to_string();

        // Handling task stopped listening but has not removed the entry yet
        ticket.receiver.close();

        assert!(matches!(
            registry.resolve(&id, ResolveAction::Respond, &responses, &logs),
            Err(ResolveError::AlreadyResolved(_))
        ));
        assert_eq!(registry.count(), 0);
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_drop_resets_connection_and_logs_sentinel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let _client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, peer) = listener.accept().await.unwrap();
        let connection = Arc::new(ConnectionHandle::attach(&stream, peer));

        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let mut ticket = registry.park(captured("/park"), Arc::clone(&connection));
        let id = ticket.id().to_string();

        let result = registry
            .resolve(&id, ResolveAction::Drop, &responses, &logs)
            .unwrap();
        assert_eq!(result.status_code, RESET_STATUS);
        assert!(connection.is_terminated());
        assert_eq!(ticket.wait().await, Some(Resolution::Dropped));

        let entries = logs.snapshot();
        assert_eq!(entries[0].status_code, 0);
        assert_eq!(entries[0].response, DROPPED_BODY);
    }

    #[tokio::test]
    async fn test_dropped_ticket_removes_entry() {
        let registry = HangingRequestRegistry::new();
        let (responses, logs) = stores();
        let ticket = registry.park(captured("/park"), detached());
        let id = ticket.id().to_string();

        drop(ticket);
        assert_eq!(registry.count(), 0);
        assert!(matches!(
            registry.resolve(&id, ResolveAction::Respond, &responses, &logs),
            Err(ResolveError::NotFound(_))
        ));
    }
}
