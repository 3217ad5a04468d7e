//! Community-forecast threshold strategy.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{Resolver, ResolverVerdict};
use crate::error::Result;
use crate::model::{Question, QuestionType, Resolution, ResolutionMetadata};

/// Resolves binary questions from the community forecast alone.
///
/// A prediction at or above `positive_threshold` resolves Positive, at or
/// below `negative_threshold` resolves Negative, and anything in between is
/// [`ResolverVerdict::Unresolvable`]. Useful as a cheap baseline against the
/// orchestrated pipeline.
pub struct ConsensusResolver {
    positive_threshold: f64,
    negative_threshold: f64,
    last_metadata: Mutex<Option<ResolutionMetadata>>,
}

impl Default for ConsensusResolver {
    fn default() -> Self {
        Self::new(95.0, 5.0)
    }
}

impl ConsensusResolver {
    /// Thresholds are percentages in `0.0..=100.0` with
    /// `negative_threshold < positive_threshold`.
    pub fn new(positive_threshold: f64, negative_threshold: f64) -> Self {
        Self {
            positive_threshold,
            negative_threshold,
            last_metadata: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Resolver for ConsensusResolver {
    async fn resolve_question(&self, question: &Question) -> Result<ResolverVerdict> {
        if question.question_type != QuestionType::Binary {
            debug!(
                question_id = question.id,
                question_type = %question.question_type,
                "consensus resolver only handles binary questions"
            );
            // No resolution happened; stale metadata would belong to an
            // earlier question.
            *self.last_metadata.lock() = None;
            return Ok(ResolverVerdict::Unsupported);
        }

        let Some(prediction) = question.community_prediction else {
            *self.last_metadata.lock() = None;
            return Ok(ResolverVerdict::Unresolvable);
        };

        let verdict = if prediction >= self.positive_threshold {
            ResolverVerdict::Resolved(Resolution::Positive)
        } else if prediction <= self.negative_threshold {
            ResolverVerdict::Resolved(Resolution::Negative)
        } else {
            ResolverVerdict::Unresolvable
        };

        *self.last_metadata.lock() = Some(ResolutionMetadata {
            reasoning: format!(
                "Community prediction of {:.1}% against thresholds >= {:.1}% (positive) \
                 and <= {:.1}% (negative).",
                prediction, self.positive_threshold, self.negative_threshold
            ),
            key_evidence: vec![format!(
                "community prediction at access time: {:.1}%",
                prediction
            )],
        });

        Ok(verdict)
    }

    fn last_resolution_metadata(&self) -> Option<ResolutionMetadata> {
        self.last_metadata.lock().clone()
    }
}
