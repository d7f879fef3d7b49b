use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::catalog::{AnswerType, Pillar};
use crate::prompt::Prompter;
use crate::results::CompanyMetadata;
use crate::scoring::{AnswerSet, AnswerValue};

/// A filled-in questionnaire as read from an answers file:
///
/// ```yaml
/// company:
///   name: Acme Bakery
///   sector: food
/// answers:
///   q1: "YES"
///   q2: "PARTIAL"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Submission {
    pub company: CompanyMetadata,
    #[serde(default)]
    pub answers: AnswerSet,
}

/// Load a submission from a YAML file
pub fn load_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file at {}", path.display()))?;
    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse answers: invalid YAML in {}", path.display()))
}

/// Ask every question of the catalog in order.
///
/// Empty input leaves a question unanswered. Anything that is not a known
/// answer (or its first letter) is asked again.
pub fn ask_answers<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    catalog: &[Pillar],
) -> Result<AnswerSet> {
    let mut answers = AnswerSet::new();

    for pillar in catalog {
        prompter.say("")?;
        prompter.say(&pillar.name)?;

        for question in &pillar.questions {
            let hint = match question.answer_type {
                AnswerType::Binary => "y/n",
                AnswerType::Ternary => "y/n/p",
            };
            let answer = loop {
                let input = prompter.ask(&format!("  {} [{}]: ", question.text, hint))?;
                if input.is_empty() {
                    break None;
                }
                match parse_answer(&input, question.answer_type) {
                    Some(answer) => break Some(answer),
                    None => prompter.say(&format!("  Invalid: expected {}. Try again.", hint))?,
                }
            };
            if let Some(answer) = answer {
                answers.insert(question.id.clone(), answer);
            }
        }
    }

    Ok(answers)
}

/// Prompt for company details
pub fn ask_company<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<CompanyMetadata> {
    let name = loop {
        let input = prompter.ask("Company name: ")?;
        if !input.is_empty() {
            break input;
        }
        prompter.say("  Invalid: must not be empty. Try again.")?;
    };
    let sector = prompter.ask("Sector (optional): ")?;

    Ok(CompanyMetadata {
        sector: (!sector.is_empty()).then_some(sector),
        ..CompanyMetadata::named(name)
    })
}

fn parse_answer(input: &str, answer_type: AnswerType) -> Option<AnswerValue> {
    let answer = match input.to_ascii_lowercase().as_str() {
        "y" => AnswerValue::Yes,
        "n" => AnswerValue::No,
        "p" => AnswerValue::Partial,
        other => AnswerValue::from(other),
    };
    match (answer, answer_type) {
        (AnswerValue::Unrecognized(_), _) | (AnswerValue::Partial, AnswerType::Binary) => None,
        (answer, _) => Some(answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PositiveAnswer, Question};
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn catalog() -> Vec<Pillar> {
        let question = |id: &str, answer_type| Question {
            id: id.to_string(),
            text: format!("Question {}?", id),
            points: 5.0,
            positive_answer: PositiveAnswer::Yes,
            answer_type,
            order: 0,
        };
        vec![Pillar {
            id: "ops".to_string(),
            name: "Operations".to_string(),
            order: 1,
            questions: vec![
                question("q1", AnswerType::Binary),
                question("q2", AnswerType::Ternary),
                question("q3", AnswerType::Ternary),
            ],
        }]
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("Y", AnswerType::Binary), Some(AnswerValue::Yes));
        assert_eq!(parse_answer("no", AnswerType::Binary), Some(AnswerValue::No));
        assert_eq!(parse_answer("partial", AnswerType::Ternary), Some(AnswerValue::Partial));
        assert_eq!(parse_answer("p", AnswerType::Binary), None);
        assert_eq!(parse_answer("maybe", AnswerType::Ternary), None);
    }

    #[test]
    fn test_ask_answers_skips_and_retries() {
        // q1: partial is not offered for binary, then yes; q2 skipped; q3 partial
        let mut p = prompter("p\ny\n\np\n");
        let answers = ask_answers(&mut p, &catalog()).unwrap();

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("q1"), Some(&AnswerValue::Yes));
        assert_eq!(answers.get("q2"), None);
        assert_eq!(answers.get("q3"), Some(&AnswerValue::Partial));
    }

    #[test]
    fn test_ask_company() {
        let mut p = prompter("\nAcme Bakery\nfood\n");
        let company = ask_company(&mut p).unwrap();
        assert_eq!(company.name, "Acme Bakery");
        assert_eq!(company.sector.as_deref(), Some("food"));
    }

    #[test]
    fn test_ask_company_fails_on_closed_input() {
        let mut p = prompter("");
        assert!(ask_company(&mut p).is_err());

        // blank lines then end of input
        let mut p = prompter("\n\n");
        assert!(ask_company(&mut p).is_err());
    }

    #[test]
    fn test_ask_answers_fails_on_closed_input() {
        let mut p = prompter("y\n");
        assert!(ask_answers(&mut p, &catalog()).is_err());
    }

    #[test]
    fn test_load_submission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.yaml");
        std::fs::write(
            &path,
            "company:\n  name: Acme\n  employees: 12\nanswers:\n  q1: \"YES\"\n  q2: \"partial\"\n",
        )
        .unwrap();

        let submission = load_submission(&path).unwrap();
        assert_eq!(submission.company.name, "Acme");
        assert_eq!(submission.company.extra.get("employees"), Some(&serde_json::json!(12)));
        assert_eq!(submission.answers.get("q2"), Some(&AnswerValue::Partial));
    }
}
