//! Resolution strategies.
//!
//! - [`Resolver`]: the capability any resolution strategy implements
//! - [`PipelineResolver`]: the orchestrated rephrase/research/resolve/parse/
//!   classify pipeline, in one-shot and streaming forms
//! - [`ConsensusResolver`]: a community-forecast threshold strategy

mod consensus;
mod events;
mod extract;
mod pipeline;

pub use consensus::ConsensusResolver;
pub use events::{EventKind, ResolveEvent, ResolutionStream};
pub use extract::{StructuredExtractor, TextExtractor};
pub use pipeline::{ModelClient, PipelineResolver, Researcher};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Question, Resolution, ResolutionMetadata};

/// Outcome of a single resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverVerdict {
    /// The strategy reached a definitive resolution.
    Resolved(Resolution),
    /// The question cannot be resolved yet (insufficient information or the
    /// resolution event has not occurred).
    Unresolvable,
    /// The strategy does not handle this question's type. Structurally
    /// distinct from [`ResolverVerdict::Unresolvable`] so the two can never
    /// be confused.
    Unsupported,
}

impl ResolverVerdict {
    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            Self::Resolved(resolution) => Some(*resolution),
            Self::Unresolvable | Self::Unsupported => None,
        }
    }
}

/// A resolution strategy.
///
/// Implementations are interchangeable and polymorphic over question type;
/// a type the strategy cannot handle yields [`ResolverVerdict::Unsupported`],
/// never an error and never a value indistinguishable from "not yet
/// resolvable".
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a single question. Errors indicate unrecoverable failure of
    /// the attempt; callers running batches catch them at the per-question
    /// boundary.
    async fn resolve_question(&self, question: &Question) -> Result<ResolverVerdict>;

    /// Reasoning and evidence from the most recent successful
    /// [`resolve_question`](Resolver::resolve_question) call on this
    /// instance, when the strategy produces any.
    fn last_resolution_metadata(&self) -> Option<ResolutionMetadata>;
}
