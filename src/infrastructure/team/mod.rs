//! Team infrastructure implementations

mod membership;
mod postgres_repository;
mod repository;
mod service;

pub use membership::{MembershipConfig, MembershipService};
pub use postgres_repository::{PostgresMembershipTransaction, PostgresTeamRepository};
pub use repository::InMemoryTeamRepository;
pub use service::{CreateTeamRequest, TeamService};
