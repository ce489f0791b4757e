//! Response registry: which response each request path receives.
//!
//! - `types`: `PathResponse`, `AdvancedBehavior` and registry errors
//! - `store`: `ResponseRegistry`, the default response plus exact-path overrides
//!
//! Matching is exact on the URL path. `/` is bound to the default response
//! and cannot be deleted; any other unconfigured path resolves to a built-in
//! 404 response.

mod store;
mod types;

pub use store::ResponseRegistry;
pub use types::{AdvancedBehavior, PathResponse, RegistryError, DEFAULT_PATH, NOT_FOUND_BODY};
