//! Survey infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresSurveyRepository;
pub use repository::InMemorySurveyRepository;
pub use service::{SubmitAnswerRequest, SurveyService};
