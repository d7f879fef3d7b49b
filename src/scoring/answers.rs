use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single questionnaire answer.
///
/// Parsing never fails: strings other than YES / NO / PARTIAL (any case) are
/// kept verbatim as `Unrecognized` and earn no credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum AnswerValue {
    Yes,
    No,
    Partial,
    Unrecognized(String),
}

impl AnswerValue {
    pub fn as_str(&self) -> &str {
        match self {
            AnswerValue::Yes => "YES",
            AnswerValue::No => "NO",
            AnswerValue::Partial => "PARTIAL",
            AnswerValue::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => AnswerValue::Yes,
            "NO" => AnswerValue::No,
            "PARTIAL" => AnswerValue::Partial,
            _ => AnswerValue::Unrecognized(s.to_string()),
        }
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::from(s.as_str())
    }
}

impl From<AnswerValue> for String {
    fn from(value: AnswerValue) -> Self {
        match value {
            AnswerValue::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers keyed by question id. Unanswered questions are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    /// Set or overwrite the answer for a question
    pub fn insert(&mut self, question_id: impl Into<String>, answer: AnswerValue) {
        self.0.insert(question_id.into(), answer);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, AnswerValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
