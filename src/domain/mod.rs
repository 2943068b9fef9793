//! Domain layer - Core business logic and entities

pub mod company;
pub mod error;
pub mod membership;
pub mod notification;
pub mod survey;
pub mod team;
pub mod user;

pub use company::{Company, CompanyId, CompanyRepository, NewCompany};
pub use error::DomainError;
pub use membership::{Invitee, ProvisionedMember, ProvisioningError, ProvisioningReport};
pub use notification::{Invitation, NotificationSink};
pub use survey::SurveyRepository;
pub use team::{MembershipTransaction, NewTeam, Team, TeamId, TeamRepository};
pub use user::{NewUser, User, UserId, UserRole, UserRepository};
