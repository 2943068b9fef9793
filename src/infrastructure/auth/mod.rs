//! Authentication infrastructure module
//!
//! HS256 bearer tokens signed with a configured secret. Retired secrets can be
//! kept for verification while tokens signed with them expire.

mod error;
mod jwt;
mod service;

pub use error::AuthError;
pub use jwt::{JwtConfig, JwtService, TokenClaims};
pub use service::{IssuedToken, TokenService};
