//! Notification sinks
//!
//! `HttpMailSender` posts invitations to a JSON mail API; `LogNotifier` is used
//! when mail delivery is disabled and only records what would have been sent.

mod http;
mod log;
mod template;

pub use http::HttpMailSender;
pub use log::LogNotifier;
pub use template::{render_invitation, survey_link, InvitationMessage, INVITATION_SUBJECT};
