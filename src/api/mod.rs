//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod companies;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod surveys;
pub mod teams;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use router::create_router_with_state;
pub use state::AppState;
