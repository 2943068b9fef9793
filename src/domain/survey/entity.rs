//! Survey entities and identifiers

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

fn positive(kind: &str, id: i64) -> Result<i64, DomainError> {
    if id <= 0 {
        return Err(DomainError::invalid_id(format!(
            "{} ID must be a positive integer, got {}",
            kind, id
        )));
    }

    Ok(id)
}

/// Survey identifier - assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(i64);

impl SurveyId {
    pub fn new(id: i64) -> Result<Self, DomainError> {
        positive("Survey", id).map(Self)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for SurveyId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .parse::<i64>()
            .map_err(|_| DomainError::invalid_id(format!("Invalid survey ID '{}'", s)))?;
        Self::new(id)
    }
}

impl std::fmt::Display for SurveyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog question identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

impl QuestionId {
    pub fn new(id: i64) -> Result<Self, DomainError> {
        positive("Question", id).map(Self)
    }

    /// Wrap an id read back from the catalog
    pub(crate) fn from_stored(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog answer option identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(i64);

impl OptionId {
    pub fn new(id: i64) -> Result<Self, DomainError> {
        positive("Option", id).map(Self)
    }

    pub(crate) fn from_stored(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one recorded answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(i64);

impl AnswerId {
    pub fn new(id: i64) -> Result<Self, DomainError> {
        positive("Response", id).map(Self)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Lifecycle of a survey; only active surveys accept answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    #[default]
    Active,
    Completed,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for SurveyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::validation(format!(
                "Unknown survey status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A survey that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub team_id: TeamId,
    pub created_by: UserId,
}

/// Survey entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub id: SurveyId,
    pub team_id: TeamId,
    pub status: SurveyStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Survey {
    /// New surveys start out active
    pub fn from_new(id: SurveyId, new_survey: NewSurvey) -> Self {
        let now = Utc::now();

        Self {
            id,
            team_id: new_survey.team_id,
            status: SurveyStatus::Active,
            created_by: new_survey.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SurveyStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: QuestionId,
    pub text: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
    pub id: OptionId,
    pub text: String,
    /// Score on the agreement scale
    pub value: i32,
}

/// An answer that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

/// One respondent's chosen option for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub option_id: OptionId,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    pub fn from_new(id: AnswerId, new_answer: NewAnswer) -> Self {
        Self {
            id,
            survey_id: new_answer.survey_id,
            user_id: new_answer.user_id,
            question_id: new_answer.question_id,
            option_id: new_answer.option_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_id() {
        assert_eq!(SurveyId::new(4).unwrap().value(), 4);
        assert!(SurveyId::new(0).is_err());
        assert!("four".parse::<SurveyId>().is_err());
        assert_eq!("12".parse::<SurveyId>().unwrap().to_string(), "12");
        assert!(QuestionId::new(-1).is_err());
        assert!(OptionId::new(0).is_err());
    }

    #[test]
    fn test_new_survey_is_active() {
        let survey = Survey::from_new(
            SurveyId::new(1).unwrap(),
            NewSurvey {
                team_id: TeamId::new(2).unwrap(),
                created_by: UserId::new(3).unwrap(),
            },
        );

        assert!(survey.is_active());
        let json = serde_json::to_value(&survey).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["team_id"], 2);
        assert_eq!(json["created_by"], 3);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!("completed".parse::<SurveyStatus>().unwrap(), SurveyStatus::Completed);
        assert_eq!(SurveyStatus::Active.to_string(), "active");
        assert!("closed".parse::<SurveyStatus>().is_err());
    }
}
