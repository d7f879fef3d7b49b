use std::time::Instant;
use tracing::{debug, info};

use super::aggregate::{build_result, rescore_result};
use super::types::{CompanyMetadata, DiagnosticResult};
use crate::catalog::Pillar;
use crate::egress::EgressLogger;
use crate::identity::Identity;
use crate::scoring::AnswerSet;
use crate::store::{EgressLogStore, ResultStore, StoreError};

/// Resource name results are stored and logged under
pub const RESULTS_RESOURCE: &str = "diagnostic_results";

/// Score a submission, persist it and log the write.
///
/// The returned result carries the id assigned by the store. The egress entry
/// is recorded after the result exists and is not awaited.
pub fn submit_result<R, L>(
    store: &R,
    logger: &EgressLogger<L>,
    identity: Option<&Identity>,
    company: CompanyMetadata,
    answers: AnswerSet,
    catalog: &[Pillar],
) -> Result<DiagnosticResult, StoreError>
where
    R: ResultStore + ?Sized,
    L: EgressLogStore + Send + Sync + 'static,
{
    let identity = identity.ok_or(StoreError::Unauthenticated)?;

    let result = build_result(company, answers, catalog);
    let started = Instant::now();
    let id = store.persist_result(identity, &result)?;
    let result = result.with_id(id);

    info!(
        id = result.id.as_deref().unwrap_or_default(),
        total = result.total_score(),
        "result saved"
    );
    logger.log_data_write(Some(identity), RESULTS_RESOURCE, &result, Some(started.elapsed()));

    Ok(result)
}

/// Rescore an existing result with new answers and replace it in the store.
pub fn edit_result<R, L>(
    store: &R,
    logger: &EgressLogger<L>,
    identity: Option<&Identity>,
    existing: &DiagnosticResult,
    answers: AnswerSet,
    catalog: &[Pillar],
) -> Result<DiagnosticResult, StoreError>
where
    R: ResultStore + ?Sized,
    L: EgressLogStore + Send + Sync + 'static,
{
    let identity = identity.ok_or(StoreError::Unauthenticated)?;

    let edited = rescore_result(existing, answers, catalog);
    let started = Instant::now();
    store.replace_result(identity, &edited)?;

    info!(
        id = edited.id.as_deref().unwrap_or_default(),
        total = edited.total_score(),
        "result updated"
    );
    logger.log_data_write(Some(identity), RESULTS_RESOURCE, &edited, Some(started.elapsed()));

    Ok(edited)
}

/// Results of `identity`, newest first.
///
/// Without an identity there is nothing to fetch and the list is empty.
pub fn fetch_results<R, L>(
    store: &R,
    logger: &EgressLogger<L>,
    identity: Option<&Identity>,
) -> Result<Vec<DiagnosticResult>, StoreError>
where
    R: ResultStore + ?Sized,
    L: EgressLogStore + Send + Sync + 'static,
{
    let Some(identity) = identity else {
        debug!("no identity, no results to fetch");
        return Ok(Vec::new());
    };

    let started = Instant::now();
    let results = store.load_results_for_user(identity)?;
    logger.log_data_fetch(Some(identity), RESULTS_RESOURCE, &results, Some(started.elapsed()));

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnswerType, PositiveAnswer, Question};
    use crate::egress::{payload_size, EgressMetadata, OperationKind};
    use crate::results::MaturityTier;
    use crate::scoring::AnswerValue;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn catalog() -> Vec<Pillar> {
        let question = |id: &str, points: f64| Question {
            id: id.to_string(),
            text: format!("Question {}", id),
            points,
            positive_answer: PositiveAnswer::Yes,
            answer_type: AnswerType::Ternary,
            order: 0,
        };
        vec![
            Pillar {
                id: "finance".to_string(),
                name: "Finance".to_string(),
                order: 1,
                questions: vec![question("q1", 10.0)],
            },
            Pillar {
                id: "marketing".to_string(),
                name: "Marketing".to_string(),
                order: 2,
                questions: vec![question("q2", 10.0)],
            },
        ]
    }

    fn answers(q1: AnswerValue, q2: AnswerValue) -> AnswerSet {
        [("q1", q1), ("q2", q2)].into_iter().collect()
    }

    fn setup() -> (Arc<MemoryStore>, EgressLogger<MemoryStore>, Identity) {
        let store = Arc::new(MemoryStore::new());
        let logger = EgressLogger::new(Arc::clone(&store));
        (store, logger, Identity::new("acme").unwrap())
    }

    #[test]
    fn test_submit_persists_and_logs_write() {
        let (store, logger, identity) = setup();

        let result = submit_result(
            store.as_ref(),
            &logger,
            Some(&identity),
            CompanyMetadata::named("Acme"),
            answers(AnswerValue::Yes, AnswerValue::Partial),
            &catalog(),
        )
        .unwrap();

        assert!(result.id.is_some());
        assert_eq!(result.total_score(), 15.0);
        assert_eq!(result.percentage_score(), 75.0);

        let stored = store.load_results_for_user(&identity).unwrap();
        assert_eq!(stored, vec![result.clone()]);

        let logs = store.all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, OperationKind::Write);
        assert_eq!(logs[0].resource_name.as_deref(), Some(RESULTS_RESOURCE));
        assert_eq!(logs[0].size_bytes, payload_size(&result));
    }

    #[test]
    fn test_submit_without_identity_is_unauthenticated() {
        let (store, logger, _) = setup();

        let err = submit_result(
            store.as_ref(),
            &logger,
            None,
            CompanyMetadata::named("Acme"),
            AnswerSet::new(),
            &catalog(),
        )
        .unwrap_err();

        assert!(matches!(err, StoreError::Unauthenticated));
        assert!(store.all_logs().is_empty());
    }

    #[test]
    fn test_submit_store_failure_propagates_without_log() {
        let (store, logger, identity) = setup();
        store.set_available(false);

        let err = submit_result(
            store.as_ref(),
            &logger,
            Some(&identity),
            CompanyMetadata::named("Acme"),
            AnswerSet::new(),
            &catalog(),
        )
        .unwrap_err();

        assert!(matches!(err, StoreError::Unavailable { .. }));
        store.set_available(true);
        assert!(store.all_logs().is_empty());
    }

    #[test]
    fn test_edit_rescores_and_replaces() {
        let (store, logger, identity) = setup();
        let catalog = catalog();

        let original = submit_result(
            store.as_ref(),
            &logger,
            Some(&identity),
            CompanyMetadata::named("Acme"),
            answers(AnswerValue::No, AnswerValue::No),
            &catalog,
        )
        .unwrap();
        assert_eq!(MaturityTier::for_score(original.total_score()), MaturityTier::Initial);

        let edited = edit_result(
            store.as_ref(),
            &logger,
            Some(&identity),
            &original,
            answers(AnswerValue::Yes, AnswerValue::Yes),
            &catalog,
        )
        .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.date, original.date);
        assert_eq!(edited.total_score(), 20.0);

        let stored = store.load_results_for_user(&identity).unwrap();
        assert_eq!(stored, vec![edited]);

        let writes = store
            .all_logs()
            .iter()
            .filter(|e| e.operation == OperationKind::Write)
            .count();
        assert_eq!(writes, 2);
    }

    #[test]
    fn test_fetch_logs_read_with_record_count() {
        let (store, logger, identity) = setup();
        let catalog = catalog();

        for _ in 0..3 {
            submit_result(
                store.as_ref(),
                &logger,
                Some(&identity),
                CompanyMetadata::named("Acme"),
                AnswerSet::new(),
                &catalog,
            )
            .unwrap();
        }

        let results = fetch_results(store.as_ref(), &logger, Some(&identity)).unwrap();
        assert_eq!(results.len(), 3);

        let reads: Vec<_> = store
            .all_logs()
            .into_iter()
            .filter(|e| e.operation == OperationKind::Read)
            .collect();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].size_bytes, payload_size(&results));
        assert_eq!(reads[0].metadata, Some(EgressMetadata::DataFetch { record_count: 3 }));
    }

    #[test]
    fn test_fetch_without_identity_is_empty() {
        let (store, logger, _) = setup();
        let results = fetch_results(store.as_ref(), &logger, None).unwrap();
        assert!(results.is_empty());
        assert!(store.all_logs().is_empty());
    }
}
