//! Integration tests for the assessment engine.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use auto_resolver::assess::{
    ActualOutcome, Assessor, OutcomeCategory, PredictedOutcome,
};
use auto_resolver::config::AssessmentConfig;
use auto_resolver::error::{ResolverError, Result, Stage};
use auto_resolver::model::{
    CancelKind, Question, QuestionType, Resolution, ResolutionMetadata,
};
use auto_resolver::resolver::{ConsensusResolver, Resolver, ResolverVerdict};
use auto_resolver::source::StaticSource;

/// Resolver answering from a fixed per-question script.
struct ScriptedResolver {
    verdicts: HashMap<u64, ResolverVerdict>,
    failing: HashSet<u64>,
    metadata: Mutex<Option<ResolutionMetadata>>,
}

impl ScriptedResolver {
    fn new(verdicts: impl IntoIterator<Item = (u64, ResolverVerdict)>) -> Self {
        Self {
            verdicts: verdicts.into_iter().collect(),
            failing: HashSet::new(),
            metadata: Mutex::new(None),
        }
    }

    fn failing_on(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.failing = ids.into_iter().collect();
        self
    }
}

#[async_trait]
impl Resolver for ScriptedResolver {
    async fn resolve_question(&self, question: &Question) -> Result<ResolverVerdict> {
        if self.failing.contains(&question.id) {
            return Err(ResolverError::collaborator(
                Stage::Research,
                "scripted collaborator outage",
            ));
        }
        let verdict = self
            .verdicts
            .get(&question.id)
            .copied()
            .unwrap_or(ResolverVerdict::Unresolvable);
        *self.metadata.lock() = Some(ResolutionMetadata {
            reasoning: format!("scripted verdict for question {}", question.id),
            key_evidence: vec![
                "first point".to_string(),
                "second point".to_string(),
                "third point".to_string(),
            ],
        });
        Ok(verdict)
    }

    fn last_resolution_metadata(&self) -> Option<ResolutionMetadata> {
        self.metadata.lock().clone()
    }
}

fn resolved_binary(id: u64, ground_truth: Resolution) -> Question {
    Question::binary(id, format!("Question {}?", id)).with_ground_truth(ground_truth, Utc::now())
}

#[tokio::test]
async fn test_correct_and_incorrect_verdicts_land_in_their_cells() {
    let questions = vec![
        resolved_binary(1, Resolution::Positive),
        resolved_binary(2, Resolution::Negative),
        resolved_binary(3, Resolution::Cancelled(CancelKind::Ambiguous)),
        resolved_binary(4, Resolution::Positive),
    ];
    let resolver = ScriptedResolver::new([
        (1, ResolverVerdict::Resolved(Resolution::Positive)),
        (2, ResolverVerdict::Resolved(Resolution::Negative)),
        (
            3,
            ResolverVerdict::Resolved(Resolution::Cancelled(CancelKind::Annulled)),
        ),
        (4, ResolverVerdict::Resolved(Resolution::Negative)),
    ]);

    let assessor = Assessor::new(resolver, StaticSource::default());
    let report = assessor.assess_questions(questions).await;

    assert_eq!(report.total_assessed(), 4);
    assert_eq!(report.matrix.correct(), 3);
    assert!((report.accuracy() - 0.75).abs() < f64::EPSILON);
    assert_eq!(
        report.matrix.cell(ActualOutcome::Positive, PredictedOutcome::Negative),
        &[4]
    );
    // Annulled vs Ambiguous collapse into one Cancelled bucket.
    assert_eq!(
        report.details[&3].outcome_category,
        OutcomeCategory::CorrectCancel
    );
    assert!(report.is_consistent());
}

#[tokio::test]
async fn test_unresolvable_counts_as_not_answered() {
    let questions = vec![resolved_binary(10, Resolution::Positive)];
    let resolver = ScriptedResolver::new([(10, ResolverVerdict::Unresolvable)]);

    let report = Assessor::new(resolver, StaticSource::default())
        .assess_questions(questions)
        .await;

    assert_eq!(
        report.matrix.cell(ActualOutcome::Positive, PredictedOutcome::NotAnswered),
        &[10]
    );
    assert_eq!(
        report.details[&10].outcome_category,
        OutcomeCategory::MissedPositive
    );
}

#[tokio::test]
async fn test_one_failure_never_poisons_the_batch() {
    let questions: Vec<Question> = [40, 41, 42, 43, 44]
        .into_iter()
        .map(|id| resolved_binary(id, Resolution::Positive))
        .collect();
    let resolver = ScriptedResolver::new(
        [40, 41, 42, 43, 44]
            .into_iter()
            .map(|id| (id, ResolverVerdict::Resolved(Resolution::Positive))),
    )
    .failing_on([42]);

    let report = Assessor::new(resolver, StaticSource::default())
        .assess_questions(questions)
        .await;

    assert_eq!(report.total_assessed(), 4);
    assert_eq!(report.failed_question_ids, vec![42]);
    assert!(!report.details.contains_key(&42));
    assert!(!report.matrix.contains(42));
}

#[tokio::test]
async fn test_unsupported_verdict_is_counted_as_unmatched() {
    let questions = vec![resolved_binary(50, Resolution::Positive)];
    let resolver = ScriptedResolver::new([(50, ResolverVerdict::Unsupported)]);

    let report = Assessor::new(resolver, StaticSource::default())
        .assess_questions(questions)
        .await;

    // Still counted, never dropped.
    assert_eq!(report.total_assessed(), 1);
    assert_eq!(
        report.matrix.cell(ActualOutcome::Positive, PredictedOutcome::NotAnswered),
        &[50]
    );
    assert_eq!(
        report.details[&50].outcome_category,
        OutcomeCategory::UnmatchedPositive
    );
}

#[tokio::test]
async fn test_unsupported_question_carries_no_sibling_metadata() {
    let questions = vec![
        resolved_binary(80, Resolution::Positive).with_community_prediction(99.0),
        Question::binary(81, "How many?")
            .with_type(QuestionType::Numeric)
            .with_ground_truth(Resolution::Positive, Utc::now()),
    ];
    let config = AssessmentConfig {
        allowed_types: vec![QuestionType::Binary, QuestionType::Numeric],
        ..Default::default()
    };

    let report = Assessor::new(ConsensusResolver::default(), StaticSource::default())
        .with_config(config)
        .assess_questions(questions)
        .await;

    let resolved = &report.details[&80];
    assert!(resolved.reasoning.as_deref().is_some_and(|r| r.contains("99.0")));

    // The unsupported question must not inherit its sibling's reasoning.
    let unsupported = &report.details[&81];
    assert_eq!(unsupported.outcome_category, OutcomeCategory::UnmatchedPositive);
    assert!(unsupported.reasoning.is_none());
    assert!(unsupported.evidence.is_empty());
}

#[tokio::test]
async fn test_cancelled_question_without_answer_is_cancelled_not_answered() {
    let questions = vec![resolved_binary(90, Resolution::Cancelled(CancelKind::Annulled))];
    let resolver = ScriptedResolver::new([(90, ResolverVerdict::Unresolvable)]);

    let report = Assessor::new(resolver, StaticSource::default())
        .assess_questions(questions)
        .await;

    assert_eq!(
        report.matrix.cell(ActualOutcome::Cancelled, PredictedOutcome::NotAnswered),
        &[90]
    );
    assert_eq!(
        report.details[&90].outcome_category,
        OutcomeCategory::CancelledNotAnswered
    );
    // Not counted as correct.
    assert_eq!(report.matrix.correct(), 0);
}

#[tokio::test]
async fn test_ineligible_questions_are_skipped_not_fatal() {
    let questions = vec![
        resolved_binary(60, Resolution::Positive),
        // Never resolved: no ground truth, no actual resolution time.
        Question::binary(61, "Still open?"),
        // Wrong type.
        Question::binary(62, "How many?")
            .with_type(QuestionType::Numeric)
            .with_ground_truth(Resolution::Positive, Utc::now()),
    ];
    let resolver =
        ScriptedResolver::new([(60, ResolverVerdict::Resolved(Resolution::Positive))]);

    let report = Assessor::new(resolver, StaticSource::default())
        .assess_questions(questions)
        .await;

    assert_eq!(report.total_assessed(), 1);
    let mut skipped = report.skipped_question_ids.clone();
    skipped.sort_unstable();
    assert_eq!(skipped, vec![61, 62]);
}

#[tokio::test]
async fn test_single_lookup_returns_the_eligibility_error() {
    let source = StaticSource::new(vec![Question::binary(70, "Still open?")]);
    let resolver = ScriptedResolver::new([]);
    let assessor = Assessor::new(resolver, source);

    let err = assessor
        .resolve_single(&auto_resolver::source::QuestionRef::Id(70))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::IneligibleQuestion { id: 70, .. }));
}

/// Resolver instrumented to observe how many calls overlap.
struct ProbeResolver {
    current: AtomicUsize,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl Resolver for ProbeResolver {
    async fn resolve_question(&self, _question: &Question) -> Result<ResolverVerdict> {
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(in_flight, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(ResolverVerdict::Resolved(Resolution::Positive))
    }

    fn last_resolution_metadata(&self) -> Option<ResolutionMetadata> {
        None
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_the_bound() {
    let peak = Arc::new(AtomicUsize::new(0));
    let resolver = ProbeResolver {
        current: AtomicUsize::new(0),
        peak: Arc::clone(&peak),
    };
    let questions: Vec<Question> = (1..=10)
        .map(|id| resolved_binary(id, Resolution::Positive))
        .collect();

    let config = AssessmentConfig {
        max_concurrent: 3,
        ..Default::default()
    };
    let report = Assessor::new(resolver, StaticSource::default())
        .with_config(config)
        .assess_questions(questions)
        .await;

    assert_eq!(report.total_assessed(), 10);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}
