//! Confusion-matrix assessment of resolution strategies.

mod engine;
mod matrix;
mod report;

pub use engine::Assessor;
pub use matrix::{
    ActualOutcome, ConfusionMatrix, OutcomeCategory, PredictedOutcome, ACTUAL_OUTCOMES,
    PREDICTED_OUTCOMES,
};
pub use report::{AssessmentReport, QuestionDetail};
