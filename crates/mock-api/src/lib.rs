//! Configurable mock HTTP endpoint.
//!
//! The public listener answers every request with the response configured
//! for its path, optionally rejecting, delaying or parking it. The admin
//! listener reconfigures responses, inspects the request log and resolves
//! parked requests.

pub mod admin_api;
pub mod capture;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod hanging;
pub mod logs;
pub mod metrics;
pub mod registry;
