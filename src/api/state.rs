//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::TokenService;
use crate::infrastructure::company::CompanyService;
use crate::infrastructure::survey::SurveyService;
use crate::infrastructure::team::{MembershipService, TeamService};
use crate::infrastructure::user::UserService;

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
    pub company_service: Arc<CompanyService>,
    pub team_service: Arc<TeamService>,
    pub membership_service: Arc<MembershipService>,
    pub survey_service: Arc<SurveyService>,
    /// Put the token validation reason in 401 bodies instead of "unauthorized"
    pub expose_token_errors: bool,
}
