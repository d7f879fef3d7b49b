pub mod aggregate;
pub mod maturity;
pub mod submit;
pub mod types;

pub use aggregate::{
    build_result, build_result_at, derive_best_worst, pillars_by_percentage, rescore_result, BestWorst,
};
pub use maturity::{
    classify_maturity, recommendation_for, Maturity, MaturityTier, PerformanceBand, DEVELOPING_MAX_SCORE,
    INITIAL_MAX_SCORE,
};
pub use submit::{edit_result, fetch_results, submit_result, RESULTS_RESOURCE};
pub use types::{CompanyMetadata, DiagnosticResult};
