//! Survey domain
//!
//! A survey is opened for one team. Members answer it by picking one option
//! for each question of the shared catalog.

mod catalog;
mod entity;
mod repository;

pub use catalog::{default_options, default_questions};
pub use entity::{
    Answer, AnswerId, NewAnswer, NewSurvey, OptionId, QuestionId, Survey, SurveyId, SurveyOption,
    SurveyQuestion, SurveyStatus,
};
pub use repository::SurveyRepository;
