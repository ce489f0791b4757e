//! Admin API request handlers.

pub mod assets;
pub mod hanging;
pub mod logs;
pub mod responses;
pub mod system;
