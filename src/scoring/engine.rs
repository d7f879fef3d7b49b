use serde::{Deserialize, Serialize};

use super::answers::{AnswerSet, AnswerValue};
use crate::catalog::{Pillar, Question};

/// Score of a single pillar. Recomputed from answers, never edited in place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PillarScore {
    pub pillar_id: String,
    pub pillar_name: String,
    pub score: f64,
    pub max_possible_score: f64,
    pub percentage_score: f64,
}

/// Output of [`compute_scores`]: per-pillar scores in catalog order plus totals.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScoreOutput {
    pub pillar_scores: Vec<PillarScore>,
    pub total_score: f64,
    pub max_possible_score: f64,
    pub percentage_score: f64,
}

/// Score an answer set against a catalog.
///
/// Per question: full points when the answer is the question's positive
/// answer, half points for `PARTIAL`, nothing otherwise (missing and
/// unrecognized answers included). Pillars are reported in catalog order and
/// totals are plain sums. Pure: the same inputs always give the same output.
pub fn compute_scores(answers: &AnswerSet, catalog: &[Pillar]) -> ScoreOutput {
    let mut total_score = 0.0;
    let mut max_possible_score = 0.0;

    let pillar_scores: Vec<PillarScore> = catalog
        .iter()
        .map(|pillar| {
            let mut score = 0.0;
            let mut max = 0.0;

            for question in &pillar.questions {
                max += question.points;
                score += question_credit(question, answers.get(&question.id));
            }

            total_score += score;
            max_possible_score += max;

            PillarScore {
                pillar_id: pillar.id.clone(),
                pillar_name: pillar.name.clone(),
                score,
                max_possible_score: max,
                percentage_score: percentage(score, max),
            }
        })
        .collect();

    ScoreOutput {
        pillar_scores,
        total_score,
        max_possible_score,
        percentage_score: percentage(total_score, max_possible_score),
    }
}

/// Points a single answer earns on a question.
///
/// `PARTIAL` earns half credit whatever the question's answer type.
pub fn question_credit(question: &Question, answer: Option<&AnswerValue>) -> f64 {
    match answer {
        Some(a) if question.positive_answer.matches(a) => question.points,
        Some(AnswerValue::Partial) => question.points / 2.0,
        _ => 0.0,
    }
}

/// `100 * score / max`, or 0 when there is nothing to score against
pub fn percentage(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        (score / max) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnswerType, PositiveAnswer};
    use pretty_assertions::assert_eq;

    fn question(id: &str, points: f64, answer_type: AnswerType) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {}", id),
            points,
            positive_answer: PositiveAnswer::Yes,
            answer_type,
            order: 0,
        }
    }

    fn pillar(id: &str, name: &str, questions: Vec<Question>) -> Pillar {
        Pillar {
            id: id.to_string(),
            name: name.to_string(),
            order: 0,
            questions,
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs
            .iter()
            .map(|(id, value)| (*id, AnswerValue::from(*value)))
            .collect()
    }

    fn two_pillar_catalog() -> Vec<Pillar> {
        vec![
            pillar("A", "Finance", vec![question("qA", 10.0, AnswerType::Binary)]),
            pillar("B", "People", vec![question("qB", 10.0, AnswerType::Ternary)]),
        ]
    }

    #[test]
    fn test_two_pillar_scenario() {
        let output = compute_scores(
            &answers(&[("qA", "YES"), ("qB", "PARTIAL")]),
            &two_pillar_catalog(),
        );

        assert_eq!(
            output.pillar_scores,
            vec![
                PillarScore {
                    pillar_id: "A".to_string(),
                    pillar_name: "Finance".to_string(),
                    score: 10.0,
                    max_possible_score: 10.0,
                    percentage_score: 100.0,
                },
                PillarScore {
                    pillar_id: "B".to_string(),
                    pillar_name: "People".to_string(),
                    score: 5.0,
                    max_possible_score: 10.0,
                    percentage_score: 50.0,
                },
            ]
        );
        assert_eq!(output.total_score, 15.0);
        assert_eq!(output.max_possible_score, 20.0);
        assert_eq!(output.percentage_score, 75.0);
    }

    #[test]
    fn test_missing_answers_earn_nothing() {
        let output = compute_scores(&AnswerSet::new(), &two_pillar_catalog());
        assert_eq!(output.total_score, 0.0);
        assert_eq!(output.max_possible_score, 20.0);
        assert_eq!(output.percentage_score, 0.0);
    }

    #[test]
    fn test_unrecognized_answer_earns_nothing() {
        let output = compute_scores(&answers(&[("qA", "MAYBE")]), &two_pillar_catalog());
        assert_eq!(output.pillar_scores[0].score, 0.0);
    }

    #[test]
    fn test_partial_on_binary_question_gets_half_credit() {
        let output = compute_scores(&answers(&[("qA", "PARTIAL")]), &two_pillar_catalog());
        assert_eq!(output.pillar_scores[0].score, 5.0);
    }

    #[test]
    fn test_reverse_worded_question() {
        let mut q = question("q1", 8.0, AnswerType::Binary);
        q.positive_answer = PositiveAnswer::No;
        let catalog = vec![pillar("A", "Risk", vec![q])];

        assert_eq!(compute_scores(&answers(&[("q1", "NO")]), &catalog).total_score, 8.0);
        assert_eq!(compute_scores(&answers(&[("q1", "YES")]), &catalog).total_score, 0.0);
        assert_eq!(compute_scores(&answers(&[("q1", "PARTIAL")]), &catalog).total_score, 4.0);
    }

    #[test]
    fn test_empty_pillar_scores_zero_percent() {
        let catalog = vec![
            pillar("A", "Finance", vec![question("qA", 10.0, AnswerType::Binary)]),
            pillar("E", "Empty", vec![]),
        ];
        let output = compute_scores(&answers(&[("qA", "YES")]), &catalog);

        let empty = &output.pillar_scores[1];
        assert_eq!(empty.max_possible_score, 0.0);
        assert_eq!(empty.percentage_score, 0.0);
        assert_eq!(output.percentage_score, 100.0);
    }

    #[test]
    fn test_empty_catalog() {
        let output = compute_scores(&answers(&[("qA", "YES")]), &[]);
        assert_eq!(output, ScoreOutput::default());
    }

    #[test]
    fn test_pillar_order_is_catalog_order() {
        let catalog = vec![
            pillar("low", "Low", vec![question("q1", 10.0, AnswerType::Binary)]),
            pillar("high", "High", vec![question("q2", 10.0, AnswerType::Binary)]),
        ];
        let output = compute_scores(&answers(&[("q2", "YES")]), &catalog);
        let ids: Vec<_> = output.pillar_scores.iter().map(|p| p.pillar_id.as_str()).collect();
        assert_eq!(ids, vec!["low", "high"]);
    }

    #[test]
    fn test_percentage_zero_guard() {
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(3.0, 4.0), 75.0);
    }
}
