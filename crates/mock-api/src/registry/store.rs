//! ResponseRegistry - path to response configuration mapping.

use super::types::{PathResponse, RegistryError, DEFAULT_PATH};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

struct RegistryState {
    default: PathResponse,
    paths: HashMap<String, PathResponse>,
}

/// Default response plus exact-path overrides behind one reader/writer lock
pub struct ResponseRegistry {
    state: RwLock<RegistryState>,
}

impl ResponseRegistry {
    /// Create a registry seeded with the default response for `/`
    pub fn new(default: PathResponse) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                default,
                paths: HashMap::new(),
            }),
        }
    }

    /// Exact lookup. `/` always resolves to the default response.
    pub fn get(&self, path: &str) -> Option<PathResponse> {
        let state = self.state.read();
        if path == DEFAULT_PATH {
            return Some(state.default.clone());
        }
        state.paths.get(path).cloned()
    }

    /// Response the public listener serves for `path`: exact match, then
    /// the default for `/`, otherwise the built-in 404.
    pub fn resolve(&self, path: &str) -> PathResponse {
        self.get(path).unwrap_or_else(PathResponse::not_found)
    }

    /// Insert or overwrite `path`; `/` replaces the default
    pub fn upsert(&self, path: &str, response: PathResponse) {
        let mut state = self.state.write();
        if path == DEFAULT_PATH {
            state.default = response;
        } else {
            state.paths.insert(path.to_string(), response);
        }
        info!(path, "Path response updated");
    }

    /// Remove `path`. Absent paths are a no-op; `/` cannot be removed.
    pub fn delete(&self, path: &str) -> Result<(), RegistryError> {
        if path == DEFAULT_PATH {
            return Err(RegistryError::InvalidOperation(
                "cannot delete default path response".to_string(),
            ));
        }
        if self.state.write().paths.remove(path).is_some() {
            info!(path, "Path response deleted");
        }
        Ok(())
    }

    /// Copy of every configured response, including `/`
    pub fn snapshot(&self) -> BTreeMap<String, PathResponse> {
        let state = self.state.read();
        let mut responses: BTreeMap<String, PathResponse> = state
            .paths
            .iter()
            .map(|(path, response)| (path.clone(), response.clone()))
            .collect();
        responses.insert(DEFAULT_PATH.to_string(), state.default.clone());
        responses
    }

    /// Number of configured paths, counting `/`
    pub fn count(&self) -> usize {
        self.state.read().paths.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry() -> ResponseRegistry {
        ResponseRegistry::new(PathResponse::ok(r#"{"status":"ok"}"#))
    }

    #[test]
    fn test_default_resolves_for_root() {
        let registry = registry();
        let response = registry.resolve("/");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"status":"ok"}"#);
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        let registry = registry();
        assert!(registry.get("/missing").is_none());
        assert_eq!(registry.resolve("/missing"), PathResponse::not_found());
        // Prefixes and trailing slashes are distinct keys
        registry.upsert("/api", PathResponse::ok("api"));
        assert_eq!(registry.resolve("/api/"), PathResponse::not_found());
        assert_eq!(registry.resolve("/ap"), PathResponse::not_found());
    }

    #[test]
    fn test_upsert_then_get_round_trips() {
        let registry = registry();
        let mut response = PathResponse::with_status(201, r#"{"ok":true}"#);
        response.advanced.delay = 0.5;

        registry.upsert("/webhook", response.clone());
        assert_eq!(registry.get("/webhook"), Some(response));
    }

    #[test]
    fn test_upsert_overwrites() {
        let registry = registry();
        registry.upsert("/a", PathResponse::ok("first"));
        registry.upsert("/a", PathResponse::with_status(500, "second"));
        assert_eq!(registry.get("/a").unwrap().body, "second");
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_upsert_root_replaces_default() {
        let registry = registry();
        registry.upsert("/", PathResponse::with_status(418, "teapot"));
        assert_eq!(registry.resolve("/").status_code, 418);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_delete_root_fails() {
        let registry = registry();
        assert!(matches!(
            registry.delete("/"),
            Err(RegistryError::InvalidOperation(_))
        ));
        assert!(registry.get("/").is_some());
    }

    #[test]
    fn test_delete_present_and_absent() {
        let registry = registry();
        registry.upsert("/gone", PathResponse::ok("soon"));

        assert!(registry.delete("/gone").is_ok());
        assert!(registry.get("/gone").is_none());
        assert_eq!(registry.resolve("/gone"), PathResponse::not_found());

        // Absent path is a no-op success
        assert!(registry.delete("/never-existed").is_ok());
    }

    #[test]
    fn test_snapshot_includes_default() {
        let registry = registry();
        registry.upsert("/b", PathResponse::ok("b"));
        registry.upsert("/a", PathResponse::ok("a"));

        let snapshot = registry.snapshot();
        let keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/", "/a", "/b"]);

        // Snapshot is a copy
        registry.upsert("/a", PathResponse::ok("changed"));
        assert_eq!(snapshot["/a"].body, "a");
    }

    #[test]
    fn test_concurrent_upserts() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        registry.upsert(&format!("/t{i}/{j}"), PathResponse::ok(format!("{j}")));
                        let _ = registry.snapshot();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.count(), 8 * 50 + 1);
    }
}
