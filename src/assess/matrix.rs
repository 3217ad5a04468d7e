//! Confusion matrix over predicted-vs-actual resolution outcomes.

use std::fmt;

use serde::Serialize;

use crate::model::Resolution;
use crate::resolver::ResolverVerdict;

/// Ground-truth outcome axis. Ambiguous and Annulled cancellations collapse
/// into one Cancelled bucket for matrix purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActualOutcome {
    Positive,
    Negative,
    Cancelled,
}

impl From<Resolution> for ActualOutcome {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Positive => Self::Positive,
            Resolution::Negative => Self::Negative,
            Resolution::Cancelled(_) => Self::Cancelled,
        }
    }
}

impl fmt::Display for ActualOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Predicted outcome axis. `NotAnswered` covers both "not yet resolvable"
/// and verdicts the strategy could not produce at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictedOutcome {
    Positive,
    Negative,
    Cancelled,
    NotAnswered,
}

impl From<&ResolverVerdict> for PredictedOutcome {
    fn from(verdict: &ResolverVerdict) -> Self {
        match verdict {
            ResolverVerdict::Resolved(Resolution::Positive) => Self::Positive,
            ResolverVerdict::Resolved(Resolution::Negative) => Self::Negative,
            ResolverVerdict::Resolved(Resolution::Cancelled(_)) => Self::Cancelled,
            ResolverVerdict::Unresolvable | ResolverVerdict::Unsupported => Self::NotAnswered,
        }
    }
}

impl fmt::Display for PredictedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Cancelled => "Cancelled",
            Self::NotAnswered => "Not Answered",
        };
        write!(f, "{}", name)
    }
}

/// Human-readable classification of one assessed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeCategory {
    #[serde(rename = "True Positive")]
    TruePositive,
    #[serde(rename = "False Negative")]
    FalseNegative,
    #[serde(rename = "Missed Positive")]
    MissedPositive,
    #[serde(rename = "Positive Incorrectly Predicted as Cancelled")]
    PositiveAsCancelled,
    #[serde(rename = "False Positive")]
    FalsePositive,
    #[serde(rename = "True Negative")]
    TrueNegative,
    #[serde(rename = "Missed Negative")]
    MissedNegative,
    #[serde(rename = "Negative Incorrectly Predicted as Cancelled")]
    NegativeAsCancelled,
    #[serde(rename = "Cancelled Incorrectly Predicted as Positive")]
    CancelledAsPositive,
    #[serde(rename = "Cancelled Incorrectly Predicted as Negative")]
    CancelledAsNegative,
    #[serde(rename = "Correct Cancel")]
    CorrectCancel,
    #[serde(rename = "Cancelled Not Answered")]
    CancelledNotAnswered,
    #[serde(rename = "Unmatched - Positive")]
    UnmatchedPositive,
    #[serde(rename = "Unmatched - Negative")]
    UnmatchedNegative,
    #[serde(rename = "Unmatched - Cancelled")]
    UnmatchedCancelled,
}

impl OutcomeCategory {
    /// Exact lookup on the closed outcome pair. Total by construction.
    pub fn classify(actual: ActualOutcome, predicted: PredictedOutcome) -> Self {
        use ActualOutcome as A;
        use PredictedOutcome as P;
        match (actual, predicted) {
            (A::Positive, P::Positive) => Self::TruePositive,
            (A::Positive, P::Negative) => Self::FalseNegative,
            (A::Positive, P::Cancelled) => Self::PositiveAsCancelled,
            (A::Positive, P::NotAnswered) => Self::MissedPositive,
            (A::Negative, P::Positive) => Self::FalsePositive,
            (A::Negative, P::Negative) => Self::TrueNegative,
            (A::Negative, P::Cancelled) => Self::NegativeAsCancelled,
            (A::Negative, P::NotAnswered) => Self::MissedNegative,
            (A::Cancelled, P::Positive) => Self::CancelledAsPositive,
            (A::Cancelled, P::Negative) => Self::CancelledAsNegative,
            (A::Cancelled, P::Cancelled) => Self::CorrectCancel,
            (A::Cancelled, P::NotAnswered) => Self::CancelledNotAnswered,
        }
    }

    /// Fallback for verdicts outside the strategy's competence. Counted in
    /// the Not Answered column, never dropped.
    pub fn unmatched(actual: ActualOutcome) -> Self {
        match actual {
            ActualOutcome::Positive => Self::UnmatchedPositive,
            ActualOutcome::Negative => Self::UnmatchedNegative,
            ActualOutcome::Cancelled => Self::UnmatchedCancelled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TruePositive => "True Positive",
            Self::FalseNegative => "False Negative",
            Self::MissedPositive => "Missed Positive",
            Self::PositiveAsCancelled => "Positive Incorrectly Predicted as Cancelled",
            Self::FalsePositive => "False Positive",
            Self::TrueNegative => "True Negative",
            Self::MissedNegative => "Missed Negative",
            Self::NegativeAsCancelled => "Negative Incorrectly Predicted as Cancelled",
            Self::CancelledAsPositive => "Cancelled Incorrectly Predicted as Positive",
            Self::CancelledAsNegative => "Cancelled Incorrectly Predicted as Negative",
            Self::CorrectCancel => "Correct Cancel",
            Self::CancelledNotAnswered => "Cancelled Not Answered",
            Self::UnmatchedPositive => "Unmatched - Positive",
            Self::UnmatchedNegative => "Unmatched - Negative",
            Self::UnmatchedCancelled => "Unmatched - Cancelled",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub const ACTUAL_OUTCOMES: [ActualOutcome; 3] = [
    ActualOutcome::Positive,
    ActualOutcome::Negative,
    ActualOutcome::Cancelled,
];

pub const PREDICTED_OUTCOMES: [PredictedOutcome; 4] = [
    PredictedOutcome::Positive,
    PredictedOutcome::Negative,
    PredictedOutcome::Cancelled,
    PredictedOutcome::NotAnswered,
];

/// 3x4 matrix of question-id lists, one cell per
/// `(ActualOutcome, PredictedOutcome)` pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfusionMatrix {
    cells: [[Vec<u64>; 4]; 3],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(actual: ActualOutcome) -> usize {
        match actual {
            ActualOutcome::Positive => 0,
            ActualOutcome::Negative => 1,
            ActualOutcome::Cancelled => 2,
        }
    }

    fn column(predicted: PredictedOutcome) -> usize {
        match predicted {
            PredictedOutcome::Positive => 0,
            PredictedOutcome::Negative => 1,
            PredictedOutcome::Cancelled => 2,
            PredictedOutcome::NotAnswered => 3,
        }
    }

    /// Record a question id in exactly one cell.
    pub fn record(&mut self, actual: ActualOutcome, predicted: PredictedOutcome, id: u64) {
        self.cells[Self::row(actual)][Self::column(predicted)].push(id);
    }

    pub fn cell(&self, actual: ActualOutcome, predicted: PredictedOutcome) -> &[u64] {
        &self.cells[Self::row(actual)][Self::column(predicted)]
    }

    pub fn count(&self, actual: ActualOutcome, predicted: PredictedOutcome) -> usize {
        self.cell(actual, predicted).len()
    }

    /// Total number of assessed questions: sum over all twelve cells.
    pub fn total(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(Vec::len)
            .sum()
    }

    /// Diagonal: exact-match predictions (PP + NN + CC).
    pub fn correct(&self) -> usize {
        ACTUAL_OUTCOMES
            .iter()
            .map(|&actual| {
                let predicted = match actual {
                    ActualOutcome::Positive => PredictedOutcome::Positive,
                    ActualOutcome::Negative => PredictedOutcome::Negative,
                    ActualOutcome::Cancelled => PredictedOutcome::Cancelled,
                };
                self.count(actual, predicted)
            })
            .sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Whether the id appears anywhere in the matrix.
    pub fn contains(&self, id: u64) -> bool {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .any(|cell| cell.contains(&id))
    }
}
