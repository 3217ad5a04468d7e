//! Markdown rendering of assessment reports.
//!
//! Rendering is pure: the same report and timestamp always produce the same
//! bytes. Only [`write_report`] touches the clock, and only for the file
//! name.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::assess::{AssessmentReport, ACTUAL_OUTCOMES, PREDICTED_OUTCOMES};
use crate::error::Result;

/// Render the confusion-matrix table alone.
pub fn render_summary(report: &AssessmentReport) -> String {
    let mut out = String::new();
    out.push_str("| Actual \\ Predicted |");
    for predicted in PREDICTED_OUTCOMES {
        let _ = write!(out, " {} |", predicted);
    }
    out.push('\n');
    out.push_str("|---|");
    for _ in PREDICTED_OUTCOMES {
        out.push_str("---|");
    }
    out.push('\n');
    for actual in ACTUAL_OUTCOMES {
        let _ = write!(out, "| {} |", actual);
        for predicted in PREDICTED_OUTCOMES {
            let _ = write!(out, " {} |", report.matrix.count(actual, predicted));
        }
        out.push('\n');
    }
    out
}

/// Render the full report.
///
/// The generation timestamp is supplied by the caller so two renderings of
/// the same report are byte-identical.
pub fn render_full(report: &AssessmentReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("# Resolution Assessment Report\n\n");
    let _ = writeln!(
        out,
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    out.push_str("## Confusion Matrix\n\n");
    out.push_str(&render_summary(report));
    out.push('\n');

    out.push_str("## Totals\n\n");
    let _ = writeln!(out, "- Assessed: {}", report.total_assessed());
    let _ = writeln!(out, "- Skipped: {}", report.skipped_question_ids.len());
    let _ = writeln!(out, "- Failed: {}", report.failed_question_ids.len());
    let _ = writeln!(out, "- Correct: {}", report.matrix.correct());
    let _ = writeln!(out, "- Accuracy: {:.1}%", report.accuracy() * 100.0);
    out.push('\n');

    // Per-question sections, sorted by (outcome category, id).
    let mut entries: Vec<_> = report.details.iter().collect();
    entries.sort_by_key(|(id, detail)| (detail.outcome_category.label(), **id));

    for (id, detail) in entries {
        let _ = writeln!(out, "## {}: {}", detail.outcome_category, detail.title);
        out.push('\n');
        let _ = writeln!(out, "- Question: [{}]({})", id, detail.url);
        out.push('\n');
        out.push_str("| Predicted | Actual |\n|---|---|\n");
        let _ = writeln!(out, "| {} | {} |", detail.predicted, detail.actual);
        out.push('\n');
        if let Some(reasoning) = &detail.reasoning {
            let _ = writeln!(out, "**Reasoning**: {}\n", reasoning);
        }
        if !detail.evidence.is_empty() {
            out.push_str("**Key Evidence**:\n\n");
            for item in &detail.evidence {
                let _ = writeln!(out, "- {}", item);
            }
            out.push('\n');
        }
    }

    out
}

/// Write the full report to `assessment_report_<UTC timestamp>.md` under
/// `dir`, creating the directory if missing. Returns the written path.
pub async fn write_report(report: &AssessmentReport, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let now = Utc::now();
    let path = dir.join(format!(
        "assessment_report_{}.md",
        now.format("%Y%m%d_%H%M%S")
    ));
    tokio::fs::write(&path, render_full(report, now)).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assess::{ActualOutcome, OutcomeCategory, PredictedOutcome, QuestionDetail};
    use std::collections::BTreeMap;

    fn sample_report() -> AssessmentReport {
        let mut report = AssessmentReport::default();
        let mut add = |id: u64, actual: ActualOutcome, predicted: PredictedOutcome| {
            report.insert(
                id,
                actual,
                predicted,
                QuestionDetail {
                    title: format!("Question {}", id),
                    url: format!("https://example.com/questions/{}", id),
                    actual,
                    predicted,
                    reasoning: Some("because".to_string()),
                    evidence: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    outcome_category: OutcomeCategory::classify(actual, predicted),
                },
            );
        };
        add(1, ActualOutcome::Positive, PredictedOutcome::Positive);
        add(2, ActualOutcome::Negative, PredictedOutcome::Positive);
        add(3, ActualOutcome::Cancelled, PredictedOutcome::NotAnswered);
        report
    }

    #[test]
    fn test_summary_has_all_rows_and_columns() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("| Positive | 1 | 0 | 0 | 0 |"));
        assert!(summary.contains("| Negative | 1 | 0 | 0 | 0 |"));
        assert!(summary.contains("| Cancelled | 0 | 0 | 0 | 1 |"));
        assert!(summary.contains("Not Answered"));
    }

    #[test]
    fn test_full_render_is_deterministic() {
        let report = sample_report();
        let at = Utc::now();
        assert_eq!(render_full(&report, at), render_full(&report, at));
    }

    #[test]
    fn test_sections_sorted_by_category_then_id() {
        let rendered = render_full(&sample_report(), Utc::now());
        let cancelled = rendered.find("## Cancelled Not Answered").unwrap();
        let false_positive = rendered.find("## False Positive").unwrap();
        let true_positive = rendered.find("## True Positive").unwrap();
        assert!(cancelled < false_positive);
        assert!(false_positive < true_positive);
    }

    #[tokio::test]
    async fn test_write_report_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("reports");
        let path = write_report(&sample_report(), &target).await.unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("assessment_report_"));
        assert!(name.ends_with(".md"));
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("# Resolution Assessment Report"));
    }
}
