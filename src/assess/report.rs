//! Assessment report: the matrix plus per-question detail.

use std::collections::BTreeMap;

use serde::Serialize;

use super::matrix::{ActualOutcome, ConfusionMatrix, OutcomeCategory, PredictedOutcome};

/// Per-question record in an assessment report.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    pub title: String,
    pub url: String,
    pub actual: ActualOutcome,
    pub predicted: PredictedOutcome,
    pub reasoning: Option<String>,
    pub evidence: Vec<String>,
    pub outcome_category: OutcomeCategory,
}

/// Immutable result of one assessment run.
///
/// Built by a single-threaded aggregation pass; the matrix and the detail
/// map stay mutually consistent (an id is in some cell iff it has a detail
/// entry).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentReport {
    pub matrix: ConfusionMatrix,
    /// Keyed by question id; `BTreeMap` keeps iteration deterministic.
    pub details: BTreeMap<u64, QuestionDetail>,
    /// Eligible questions whose resolution attempt failed and were excluded.
    pub failed_question_ids: Vec<u64>,
    /// Questions skipped before resolution (ineligible for assessment).
    pub skipped_question_ids: Vec<u64>,
}

impl AssessmentReport {
    pub(crate) fn insert(
        &mut self,
        id: u64,
        actual: ActualOutcome,
        predicted: PredictedOutcome,
        detail: QuestionDetail,
    ) {
        self.matrix.record(actual, predicted, id);
        self.details.insert(id, detail);
    }

    pub fn total_assessed(&self) -> usize {
        self.matrix.total()
    }

    pub fn accuracy(&self) -> f64 {
        self.matrix.accuracy()
    }

    /// Matrix cells and detail map agree on membership.
    pub fn is_consistent(&self) -> bool {
        self.details.len() == self.matrix.total()
            && self.details.keys().all(|&id| self.matrix.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(actual: ActualOutcome, predicted: PredictedOutcome) -> QuestionDetail {
        QuestionDetail {
            title: "t".to_string(),
            url: "u".to_string(),
            actual,
            predicted,
            reasoning: None,
            evidence: Vec::new(),
            outcome_category: OutcomeCategory::classify(actual, predicted),
        }
    }

    #[test]
    fn test_insert_keeps_matrix_and_details_consistent() {
        let mut report = AssessmentReport::default();
        report.insert(
            7,
            ActualOutcome::Positive,
            PredictedOutcome::Positive,
            detail(ActualOutcome::Positive, PredictedOutcome::Positive),
        );
        report.insert(
            8,
            ActualOutcome::Cancelled,
            PredictedOutcome::NotAnswered,
            detail(ActualOutcome::Cancelled, PredictedOutcome::NotAnswered),
        );

        assert!(report.is_consistent());
        assert_eq!(report.total_assessed(), 2);
        assert!((report.accuracy() - 0.5).abs() < f64::EPSILON);
    }
}
