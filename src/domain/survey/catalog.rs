//! Built-in question and option catalog
//!
//! Seeded into both stores so identifiers match across backends.

use super::entity::{OptionId, QuestionId, SurveyOption, SurveyQuestion};

const QUESTIONS: &[(&str, &str)] = &[
    ("I know what is expected of me at work", "clarity"),
    ("Our team goals are clear to everyone", "clarity"),
    ("I can raise concerns without fear of blame", "safety"),
    ("Mistakes are treated as chances to learn", "safety"),
    ("I can rely on my teammates to deliver", "dependability"),
    ("My work has a visible impact", "impact"),
    ("I would recommend this team to a friend", "engagement"),
];

const OPTIONS: &[(&str, i32)] = &[
    ("Strongly disagree", 1),
    ("Disagree", 2),
    ("Neutral", 3),
    ("Agree", 4),
    ("Strongly agree", 5),
];

/// Questions with ids starting at 1, in catalog order
pub fn default_questions() -> Vec<SurveyQuestion> {
    QUESTIONS
        .iter()
        .zip(1..)
        .map(|((text, category), id)| SurveyQuestion {
            id: QuestionId::from_stored(id),
            text: (*text).to_string(),
            category: (*category).to_string(),
        })
        .collect()
}

/// Answer options with ids starting at 1, lowest value first
pub fn default_options() -> Vec<SurveyOption> {
    OPTIONS
        .iter()
        .zip(1..)
        .map(|((text, value), id)| SurveyOption {
            id: OptionId::from_stored(id),
            text: (*text).to_string(),
            value: *value,
        })
        .collect()
}
