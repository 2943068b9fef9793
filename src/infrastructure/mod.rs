//! Infrastructure layer - Store, token, mail and logging implementations

pub mod auth;
pub mod company;
pub mod logging;
pub mod notification;
pub mod storage;
pub mod survey;
pub mod team;
pub mod user;
