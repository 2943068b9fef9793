//! Invitation message rendering

use crate::domain::notification::Invitation;
use crate::domain::team::TeamId;

pub const INVITATION_SUBJECT: &str = "You have been invited to a team survey";

/// Rendered invitation ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationMessage {
    pub subject: String,
    pub text: String,
}

/// Survey entry point for a team
pub fn survey_link(survey_base_url: &str, team_id: TeamId) -> String {
    format!(
        "{}/surveys/team/{}",
        survey_base_url.trim_end_matches('/'),
        team_id
    )
}

pub fn render_invitation(invitation: &Invitation, survey_base_url: &str) -> InvitationMessage {
    let link = survey_link(survey_base_url, invitation.team_id);

    let text = format!(
        "Hello {name},\n\n\
         You have been added to a team and invited to answer its survey.\n\n\
         Sign in with your email address and this temporary password:\n\n\
         \x20   {password}\n\n\
         Please change it after your first login.\n\n\
         Start the survey here: {link}\n",
        name = invitation.name,
        password = invitation.temporary_password,
        link = link,
    );

    InvitationMessage {
        subject: INVITATION_SUBJECT.to_string(),
        text,
    }
}
