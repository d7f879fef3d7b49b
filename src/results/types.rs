use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::{AnswerSet, ScoreOutput};

/// Company details captured with a submission.
///
/// Only `name` is interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CompanyMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CompanyMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A scored questionnaire submission.
///
/// `id` is `None` until the record store assigns one. Scores are only ever
/// replaced as a whole (see [`super::rescore_result`]).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiagnosticResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "created_at")]
    pub date: DateTime<Utc>,
    #[serde(rename = "company_data")]
    pub company: CompanyMetadata,
    pub answers: AnswerSet,
    #[serde(flatten)]
    pub scores: ScoreOutput,
}

impl DiagnosticResult {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn total_score(&self) -> f64 {
        self.scores.total_score
    }

    pub fn percentage_score(&self) -> f64 {
        self.scores.percentage_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{AnswerValue, PillarScore};
    use chrono::TimeZone;

    fn sample_result() -> DiagnosticResult {
        let mut company = CompanyMetadata::named("Acme Bakery");
        company.extra.insert("employees".to_string(), serde_json::json!(12));

        DiagnosticResult {
            id: None,
            date: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            company,
            answers: [("q1", AnswerValue::Yes)].into_iter().collect(),
            scores: ScoreOutput {
                pillar_scores: vec![PillarScore {
                    pillar_id: "finance".to_string(),
                    pillar_name: "Finance".to_string(),
                    score: 10.0,
                    max_possible_score: 10.0,
                    percentage_score: 100.0,
                }],
                total_score: 10.0,
                max_possible_score: 10.0,
                percentage_score: 100.0,
            },
        }
    }

    #[test]
    fn test_record_field_names() {
        let json = serde_json::to_value(sample_result().with_id("r-1")).unwrap();

        assert_eq!(json["id"], "r-1");
        assert_eq!(json["company_data"]["name"], "Acme Bakery");
        assert_eq!(json["company_data"]["employees"], 12);
        assert_eq!(json["answers"]["q1"], "YES");
        assert_eq!(json["pillar_scores"][0]["pillar_id"], "finance");
        assert_eq!(json["total_score"], 10.0);
        assert_eq!(json["max_possible_score"], 10.0);
        assert_eq!(json["percentage_score"], 100.0);
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_unsaved_result_has_no_id_field() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_record_reads_back() {
        let result = sample_result().with_id("r-1");
        let json = serde_json::to_string(&result).unwrap();
        let parsed: DiagnosticResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
