use std::collections::HashSet;

use super::types::Pillar;

/// Validate a catalog after loading.
/// Returns all validation errors at once (not just the first).
///
/// A pillar without questions is allowed: it scores 0% instead of failing.
pub fn validate_catalog(pillars: &[Pillar]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut pillar_ids = HashSet::new();
    let mut question_ids = HashSet::new();

    for (i, pillar) in pillars.iter().enumerate() {
        if pillar.id.trim().is_empty() {
            errors.push(format!("pillars[{}].id: must not be empty", i));
        } else if !pillar_ids.insert(pillar.id.as_str()) {
            errors.push(format!("pillars[{}].id: duplicate pillar id '{}'", i, pillar.id));
        }

        if pillar.name.trim().is_empty() {
            errors.push(format!("pillars[{}].name: must not be empty", i));
        }

        for (j, question) in pillar.questions.iter().enumerate() {
            if question.id.trim().is_empty() {
                errors.push(format!("pillars[{}].questions[{}].id: must not be empty", i, j));
            } else if !question_ids.insert(question.id.as_str()) {
                errors.push(format!(
                    "pillars[{}].questions[{}].id: duplicate question id '{}'",
                    i, j, question.id
                ));
            }

            if !(question.points.is_finite() && question.points > 0.0) {
                errors.push(format!(
                    "pillars[{}].questions[{}].points: must be a positive number, got {}",
                    i, j, question.points
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
