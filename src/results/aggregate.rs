use chrono::{DateTime, Utc};

use super::types::{CompanyMetadata, DiagnosticResult};
use crate::catalog::Pillar;
use crate::scoring::{compute_scores, AnswerSet, PillarScore};

/// Score a submission and wrap it into a new, unsaved result stamped now.
pub fn build_result(
    company: CompanyMetadata,
    answers: AnswerSet,
    catalog: &[Pillar],
) -> DiagnosticResult {
    build_result_at(company, answers, catalog, Utc::now())
}

/// [`build_result`] with an explicit creation time
pub fn build_result_at(
    company: CompanyMetadata,
    answers: AnswerSet,
    catalog: &[Pillar],
    date: DateTime<Utc>,
) -> DiagnosticResult {
    let scores = compute_scores(&answers, catalog);
    DiagnosticResult {
        id: None,
        date,
        company,
        answers,
        scores,
    }
}

/// Recompute an edited result.
///
/// Keeps the id, creation date and company of `existing`; answers and every
/// score field come from a fresh scoring run. Nothing is patched per pillar.
pub fn rescore_result(
    existing: &DiagnosticResult,
    answers: AnswerSet,
    catalog: &[Pillar],
) -> DiagnosticResult {
    DiagnosticResult {
        id: existing.id.clone(),
        ..build_result_at(existing.company.clone(), answers, catalog, existing.date)
    }
}

/// Highest and lowest scoring pillars of a result
#[derive(Debug, Clone, PartialEq)]
pub struct BestWorst<'a> {
    pub best: &'a PillarScore,
    pub worst: &'a PillarScore,
}

/// Pick the best and worst pillar by percentage.
///
/// Pillars are stably sorted by percentage, highest first: among equal
/// percentages the catalog-earliest pillar is `best` and the catalog-latest is
/// `worst`. Returns `None` when the result has no pillars.
pub fn derive_best_worst(result: &DiagnosticResult) -> Option<BestWorst<'_>> {
    let sorted = pillars_by_percentage(&result.scores.pillar_scores);
    Some(BestWorst {
        best: sorted.first().copied()?,
        worst: sorted.last().copied()?,
    })
}

/// Pillar scores ordered by percentage, highest first, ties in catalog order.
pub fn pillars_by_percentage(pillar_scores: &[PillarScore]) -> Vec<&PillarScore> {
    let mut sorted: Vec<&PillarScore> = pillar_scores.iter().collect();
    // sort_by is stable; equal percentages keep catalog order
    sorted.sort_by(|a, b| b.percentage_score.total_cmp(&a.percentage_score));
    sorted
}
