//! Team domain module
//!
//! Teams belong to exactly one company and hold membership links to users.
//! Membership writes for a batch go through a [`MembershipTransaction`].

mod entity;
mod repository;
mod validation;

pub use entity::{NewTeam, Team, TeamId};
#[cfg(test)]
pub use repository::MockMembershipTransaction;
pub use repository::{MembershipTransaction, TeamRepository};
pub use validation::{
    validate_team_description, validate_team_id, validate_team_name, TeamValidationError,
};
