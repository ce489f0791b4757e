//! Hanging request registry.
//!
//! A path configured with `hangUp` parks each request here instead of
//! answering it. The handling task holds a [`ParkedTicket`] and waits on a
//! one-shot completion signal; an operator later resolves the entry by id,
//! either answering it with the path's current configuration or resetting
//! the connection.
//!
//! - `types`: summaries, actions, resolution results and errors
//! - `registry`: `HangingRequestRegistry` and `ParkedTicket`

mod registry;
mod types;

pub use registry::{HangingRequestRegistry, ParkedTicket};
pub use types::{HangingRequest, Resolution, ResolutionResult, ResolveAction, ResolveError};
