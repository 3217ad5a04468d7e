//! Assessment engine: fan a resolver out over resolved questions and score
//! its verdicts against ground truth.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use super::matrix::{ActualOutcome, OutcomeCategory, PredictedOutcome};
use super::report::{AssessmentReport, QuestionDetail};
use crate::config::AssessmentConfig;
use crate::error::Result;
use crate::model::{Question, ResolutionMetadata};
use crate::resolver::{Resolver, ResolverVerdict};
use crate::source::{QuestionFilter, QuestionRef, QuestionSource};

/// Benchmarks a resolution strategy over already-resolved questions.
///
/// At most `max_concurrent` resolutions run at once; a failure on one
/// question excludes that question and never aborts its siblings. The whole
/// run is an ordinary future, so dropping it cancels all in-flight work.
pub struct Assessor<R, S> {
    resolver: R,
    source: S,
    config: AssessmentConfig,
}

impl<R, S> Assessor<R, S>
where
    R: Resolver,
    S: QuestionSource,
{
    pub fn new(resolver: R, source: S) -> Self {
        Self {
            resolver,
            source,
            config: AssessmentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AssessmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Assess explicit question references.
    pub async fn assess_refs(&self, references: &[QuestionRef]) -> Result<AssessmentReport> {
        let mut questions = Vec::with_capacity(references.len());
        for reference in references {
            questions.push(self.source.question_by_ref(reference).await?);
        }
        Ok(self.assess_questions(questions).await)
    }

    /// Assess every question the source yields for the filter.
    pub async fn assess_matching(&self, filter: &QuestionFilter) -> Result<AssessmentReport> {
        let questions = self.source.questions_matching(filter).await?;
        Ok(self.assess_questions(questions).await)
    }

    /// Resolve one question, returning the eligibility error directly
    /// instead of skipping.
    pub async fn resolve_single(
        &self,
        reference: &QuestionRef,
    ) -> Result<(ResolverVerdict, Option<ResolutionMetadata>)> {
        let question = self.source.question_by_ref(reference).await?;
        question.check_eligibility(&self.config.allowed_types)?;
        let verdict = self.resolver.resolve_question(&question).await?;
        let metadata = self.resolver.last_resolution_metadata();
        Ok((verdict, metadata))
    }

    /// Assess a batch of candidate questions.
    ///
    /// Ineligible candidates are skipped with a warning; eligible ones fan
    /// out under the concurrency bound; classification happens in a single
    /// aggregation pass after every future has settled.
    pub async fn assess_questions(&self, candidates: Vec<Question>) -> AssessmentReport {
        let mut report = AssessmentReport::default();
        let mut eligible = Vec::with_capacity(candidates.len());

        for question in candidates {
            match question.check_eligibility(&self.config.allowed_types) {
                Ok(()) => eligible.push(question),
                Err(e) => {
                    warn!(question_id = question.id, reason = %e, "skipping question");
                    report.skipped_question_ids.push(question.id);
                }
            }
        }

        info!(
            eligible = eligible.len(),
            skipped = report.skipped_question_ids.len(),
            max_concurrent = self.config.max_concurrent,
            "starting assessment run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let attempts = eligible.into_iter().map(|question| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // Holding the permit across the whole resolution is what
                // bounds in-flight work.
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (question, Err("semaphore closed".to_string())),
                };
                let outcome = match tokio::time::timeout(
                    timeout,
                    self.resolver.resolve_question(&question),
                )
                .await
                {
                    Ok(Ok(verdict)) => {
                        // Read immediately after the await so concurrent
                        // siblings cannot overwrite this question's metadata.
                        let metadata = self.resolver.last_resolution_metadata();
                        Ok((verdict, metadata))
                    }
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
                };
                (question, outcome)
            }
        });

        for (question, outcome) in join_all(attempts).await {
            match outcome {
                Ok((verdict, metadata)) => self.insert_result(&mut report, question, verdict, metadata),
                Err(reason) => {
                    error!(question_id = question.id, reason = %reason, "resolution failed");
                    report.failed_question_ids.push(question.id);
                }
            }
        }

        info!(
            assessed = report.total_assessed(),
            failed = report.failed_question_ids.len(),
            accuracy = report.accuracy(),
            "assessment run finished"
        );
        report
    }

    fn insert_result(
        &self,
        report: &mut AssessmentReport,
        question: Question,
        verdict: ResolverVerdict,
        mut metadata: Option<ResolutionMetadata>,
    ) {
        // Eligibility guaranteed ground_truth is present.
        let Some(ground_truth) = question.ground_truth else {
            warn!(question_id = question.id, "ground truth vanished, excluding");
            report.failed_question_ids.push(question.id);
            return;
        };

        let actual = ActualOutcome::from(ground_truth);
        let predicted = PredictedOutcome::from(&verdict);
        let outcome_category = if verdict == ResolverVerdict::Unsupported {
            warn!(
                question_id = question.id,
                "verdict outside the strategy's competence, counted as unmatched"
            );
            // An unsupported question produced no reasoning of its own; any
            // metadata on the resolver belongs to an earlier sibling.
            metadata = None;
            OutcomeCategory::unmatched(actual)
        } else {
            OutcomeCategory::classify(actual, predicted)
        };

        let (reasoning, evidence) = match metadata {
            Some(m) => (Some(m.reasoning), m.key_evidence),
            None => (None, Vec::new()),
        };

        report.insert(
            question.id,
            actual,
            predicted,
            QuestionDetail {
                title: question.text,
                url: question.canonical_url,
                actual,
                predicted,
                reasoning,
                evidence,
                outcome_category,
            },
        );
    }
}
