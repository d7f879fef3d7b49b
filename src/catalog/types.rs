use serde::{Deserialize, Serialize};

use crate::scoring::AnswerValue;

/// How a question may be answered in the questionnaire.
///
/// The scoring engine does not distinguish between the two: a `PARTIAL`
/// answer earns half credit on any question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerType {
    /// YES / NO
    Binary,
    /// YES / PARTIAL / NO
    Ternary,
}

/// The answer that earns a question its full points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositiveAnswer {
    #[default]
    Yes,
    /// Reverse-worded question ("Do you lack a budget?")
    No,
}

impl PositiveAnswer {
    pub fn matches(&self, answer: &AnswerValue) -> bool {
        matches!(
            (self, answer),
            (PositiveAnswer::Yes, AnswerValue::Yes) | (PositiveAnswer::No, AnswerValue::No)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub points: f64,
    #[serde(default)]
    pub positive_answer: PositiveAnswer,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Pillar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Pillar {
    /// Sum of the points of every question in the pillar
    pub fn max_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// Top-level shape of a catalog file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub pillars: Vec<Pillar>,
}
