pub mod answers;
pub mod engine;

pub use answers::{AnswerSet, AnswerValue};
pub use engine::{compute_scores, percentage, question_credit, PillarScore, ScoreOutput};
