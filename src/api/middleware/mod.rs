//! API middleware components

pub mod identity;
pub mod logging;

pub use identity::{extract_bearer_token, require_identity, Identity};
pub use logging::logging_middleware;
