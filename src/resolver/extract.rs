//! Structured extraction of a resolver's free-text decision.

use async_trait::async_trait;

use crate::error::{ResolverError, Result};
use crate::model::StructuredResolution;

/// Extracts a validated [`StructuredResolution`] from free text.
///
/// LLM-backed implementations are external collaborators; the crate ships
/// [`TextExtractor`] for decisions that follow the labeled output format.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<StructuredResolution>;
}

/// Line-based extractor for the labeled decision format:
///
/// ```text
/// **Resolution Status**: TRUE
/// **Reasoning**: The criteria were met on ...
/// **Key Evidence**:
/// - first point
/// - second point
/// - third point
/// ```
///
/// Markdown bold markers are optional; `Resolution:` is accepted as a status
/// label alias. A missing or malformed section fails with
/// [`ResolverError::StructuredOutputParse`] carrying the original text; an
/// unknown status label is a contract violation and surfaces as
/// [`ResolverError::UnknownStatusLabel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, text: &str) -> Result<StructuredResolution> {
        let mut status_label: Option<String> = None;
        let mut reasoning: Option<String> = None;
        let mut key_evidence: Vec<String> = Vec::new();
        let mut in_evidence = false;

        for raw_line in text.lines() {
            let line = raw_line.replace("**", "");
            let line = line.trim();

            if let Some(value) = strip_label(line, &["Resolution Status:", "Resolution:"]) {
                status_label = Some(value.to_string());
                in_evidence = false;
            } else if let Some(value) = strip_label(line, &["Reasoning:"]) {
                reasoning = Some(value.to_string());
                in_evidence = false;
            } else if strip_label(line, &["Key Evidence:", "Key Evidence"]).is_some() {
                in_evidence = true;
            } else if in_evidence {
                if let Some(item) = line.strip_prefix("- ") {
                    key_evidence.push(item.trim().to_string());
                } else if !line.is_empty() {
                    in_evidence = false;
                }
            }
        }

        let status_label = status_label.ok_or_else(|| ResolverError::StructuredOutputParse {
            raw_output: text.to_string(),
            reason: "no resolution status line found".to_string(),
        })?;
        // Unknown labels propagate as-is: a contract violation, not a parse
        // failure to be retried.
        let resolution_status = status_label.parse()?;

        let reasoning = reasoning.ok_or_else(|| ResolverError::StructuredOutputParse {
            raw_output: text.to_string(),
            reason: "no reasoning line found".to_string(),
        })?;

        StructuredResolution::new(resolution_status, reasoning, key_evidence).map_err(|e| {
            match e {
                ResolverError::KeyEvidenceBounds { got, min, max } => {
                    ResolverError::StructuredOutputParse {
                        raw_output: text.to_string(),
                        reason: format!(
                            "expected {}..={} key evidence items, found {}",
                            min, max, got
                        ),
                    }
                }
                other => other,
            }
        })
    }
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| line.strip_prefix(label).map(str::trim))
}

#[async_trait]
impl StructuredExtractor for TextExtractor {
    async fn extract(&self, text: &str) -> Result<StructuredResolution> {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResolutionStatus;

    const WELL_FORMED: &str = "\
**Resolution Status**: TRUE

**Reasoning**: The event occurred before the deadline.

**Key Evidence**:
- official announcement on 2026-03-01
- confirmed by two independent outlets
- no disputes reported
";

    #[test]
    fn test_extracts_well_formed_decision() {
        let structured = TextExtractor::new().parse(WELL_FORMED).unwrap();
        assert_eq!(structured.resolution_status, ResolutionStatus::True);
        assert_eq!(
            structured.reasoning,
            "The event occurred before the deadline."
        );
        assert_eq!(structured.key_evidence.len(), 3);
        assert_eq!(
            structured.key_evidence[0],
            "official announcement on 2026-03-01"
        );
    }

    #[test]
    fn test_accepts_plain_labels_without_bold() {
        let text = "Resolution: NOT_YET_RESOLVABLE\nReasoning: too early\nKey Evidence:\n- a\n- b\n- c\n";
        let structured = TextExtractor::new().parse(text).unwrap();
        assert_eq!(
            structured.resolution_status,
            ResolutionStatus::NotYetResolvable
        );
    }

    #[test]
    fn test_parse_failure_retains_raw_output() {
        let garbage = "I could not decide anything useful here.";
        let err = TextExtractor::new().parse(garbage).unwrap_err();
        match err {
            ResolverError::StructuredOutputParse { raw_output, .. } => {
                assert_eq!(raw_output, garbage);
            }
            other => panic!("expected StructuredOutputParse, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_label_is_a_contract_violation() {
        let text = "Resolution Status: PROBABLY\nReasoning: hmm\nKey Evidence:\n- a\n- b\n- c\n";
        let err = TextExtractor::new().parse(text).unwrap_err();
        assert!(matches!(err, ResolverError::UnknownStatusLabel(_)));
    }

    #[test]
    fn test_too_few_evidence_items_fails_parse_with_raw() {
        let text = "Resolution Status: FALSE\nReasoning: clear\nKey Evidence:\n- only one\n";
        let err = TextExtractor::new().parse(text).unwrap_err();
        assert!(matches!(
            err,
            ResolverError::StructuredOutputParse { ref raw_output, .. } if raw_output == text
        ));
    }
}
