//! Orchestrated resolution pipeline.
//!
//! One question moves through five strictly sequential stages:
//! rephrase (optional) -> research -> resolve -> parse -> classify.
//! Research and model calls are opaque delegated operations behind the
//! [`Researcher`] and [`ModelClient`] traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::events::{EventPublisher, ResolutionStream, ResolveEvent};
use super::extract::StructuredExtractor;
use super::{Resolver, ResolverVerdict};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{Question, QuestionType, ResolutionMetadata, StructuredResolution};

/// Opaque delegated language-model call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Opaque delegated research capability: question text in, evidence blob out.
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, question_text: &str) -> Result<String>;
}

/// Reference resolver executing the fixed multi-stage pipeline.
///
/// Collaborators are shared behind `Arc` so the resolver is cheap to clone
/// into a streaming task; the last-resolution metadata slot is shared across
/// clones.
pub struct PipelineResolver {
    model: Arc<dyn ModelClient>,
    researcher: Arc<dyn Researcher>,
    extractor: Arc<dyn StructuredExtractor>,
    config: PipelineConfig,
    last_metadata: Arc<Mutex<Option<ResolutionMetadata>>>,
}

impl Clone for PipelineResolver {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            researcher: Arc::clone(&self.researcher),
            extractor: Arc::clone(&self.extractor),
            config: self.config.clone(),
            last_metadata: Arc::clone(&self.last_metadata),
        }
    }
}

impl PipelineResolver {
    pub fn new(
        model: Arc<dyn ModelClient>,
        researcher: Arc<dyn Researcher>,
        extractor: Arc<dyn StructuredExtractor>,
    ) -> Self {
        Self {
            model,
            researcher,
            extractor,
            config: PipelineConfig::default(),
            last_metadata: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Streaming counterpart to [`Resolver::resolve_question`].
    ///
    /// The pipeline runs on a background task and publishes ordered events;
    /// exactly one terminal `Result`/`Error` event closes the sequence.
    /// Consumers may drop the stream at any point without corrupting
    /// resolver state, and metadata becomes available to
    /// [`Resolver::last_resolution_metadata`] only after a `Result` event.
    pub fn resolve_question_streamed(&self, question: Question) -> ResolutionStream {
        let (publisher, stream) = EventPublisher::channel(self.config.event_channel_capacity);
        let resolver = self.clone();
        tokio::spawn(async move {
            if let Err(e) = resolver.run(&question, &publisher).await {
                publisher.publish(ResolveEvent::error(e.to_string()));
            }
        });
        stream
    }

    /// Execute the pipeline, publishing progress events along the way.
    ///
    /// Publishes the terminal event itself on every `Ok` path: `Result` for
    /// a completed resolution, `Error` for an unsupported question type.
    /// `Err` paths leave terminal publication to the caller.
    async fn run(
        &self,
        question: &Question,
        events: &EventPublisher,
    ) -> Result<ResolverVerdict> {
        if question.question_type != QuestionType::Binary {
            warn!(
                question_id = question.id,
                question_type = %question.question_type,
                "question type not supported by the pipeline resolver"
            );
            // No resolution happened: drop any stale metadata and terminate
            // the event sequence with an error, not a result.
            *self.last_metadata.lock() = None;
            events.publish(ResolveEvent::error(format!(
                "Unsupported question type: {}",
                question.question_type
            )));
            return Ok(ResolverVerdict::Unsupported);
        }

        info!(question_id = question.id, "starting resolution pipeline");

        // Stage 1: rephrase (never aborts the pipeline).
        events.publish(ResolveEvent::status(
            "Checking if question needs rephrasing...",
        ));
        let text = self.rephrase_if_needed(question).await;
        events.publish(ResolveEvent::status(format!("Question text: {}", text)));

        // Stage 2: research.
        events.publish(ResolveEvent::status("Researching question..."));
        let evidence = self.researcher.research(&text).await?;
        events.publish(ResolveEvent::tool(format!(
            "research completed ({} bytes of evidence)",
            evidence.len()
        )));

        // Stage 3: resolve.
        events.publish(ResolveEvent::status("Determining resolution..."));
        let decision = self
            .model
            .invoke(&decision_prompt(question, &text, &evidence))
            .await?;
        events.publish(ResolveEvent::text(decision.clone()));

        // Stage 4: parse.
        events.publish(ResolveEvent::status("Parsing resolution output..."));
        let structured = match self.extractor.extract(&decision).await {
            Ok(structured) => structured,
            Err(e) => {
                *self.last_metadata.lock() = None;
                return Err(e);
            }
        };
        debug!(
            question_id = question.id,
            status = %structured.resolution_status,
            "parsed structured resolution"
        );

        // Stage 5: classify, then stash metadata for later retrieval.
        let resolution = structured.classify();
        *self.last_metadata.lock() = Some(structured.metadata());

        events.publish(ResolveEvent::result(format_result(&structured)));
        info!(
            question_id = question.id,
            resolution = ?resolution,
            "resolution pipeline finished"
        );

        Ok(match resolution {
            Some(resolution) => ResolverVerdict::Resolved(resolution),
            None => ResolverVerdict::Unresolvable,
        })
    }

    /// Rewrite the question into past tense when its deadline has passed, to
    /// improve downstream research. Failures are logged and the original
    /// text is used; this stage must never abort the pipeline.
    async fn rephrase_if_needed(&self, question: &Question) -> String {
        if !self.config.rephrase || question.scheduled_resolution_time > Utc::now() {
            return question.text.clone();
        }

        match self.model.invoke(&rephrase_prompt(&question.text)).await {
            Ok(rephrased) => {
                let rephrased = rephrased.trim().trim_matches('"').trim_matches('\'');
                if !rephrased.is_empty() && rephrased != question.text {
                    info!(
                        question_id = question.id,
                        original = %question.text,
                        rephrased = %rephrased,
                        "question rephrased for research"
                    );
                    rephrased.to_string()
                } else {
                    debug!(question_id = question.id, "no rephrasing needed");
                    question.text.clone()
                }
            }
            Err(e) => {
                warn!(
                    question_id = question.id,
                    error = %e,
                    "question rephrasing failed, proceeding with original text"
                );
                question.text.clone()
            }
        }
    }
}

#[async_trait]
impl Resolver for PipelineResolver {
    async fn resolve_question(&self, question: &Question) -> Result<ResolverVerdict> {
        self.run(question, &EventPublisher::disconnected()).await
    }

    fn last_resolution_metadata(&self) -> Option<ResolutionMetadata> {
        self.last_metadata.lock().clone()
    }
}

fn rephrase_prompt(question_text: &str) -> String {
    format!(
        "The deadline of the following forecasting question has passed. \
         Rewrite it from future tense to past tense so that news searches \
         about it are more effective. Reply with the rewritten question only.\n\n\
         Question: {}",
        question_text
    )
}

fn decision_prompt(question: &Question, question_text: &str, evidence: &str) -> String {
    format!(
        "You are determining the final resolution of a forecasting question \
         based on the research below.\n\n\
         # Question\n{}\n\n\
         # Resolution Criteria\n{}\n\n\
         # Research\n{}\n\n\
         Decide one of: TRUE, FALSE, AMBIGUOUS, ANNULLED, NOT_YET_RESOLVABLE. \
         Be conservative: default to NOT_YET_RESOLVABLE when uncertain.\n\n\
         Answer in exactly this format:\n\n\
         **Resolution Status**: [status]\n\n\
         **Reasoning**: [2-4 sentences]\n\n\
         **Key Evidence**:\n- [point 1]\n- [point 2]\n- [point 3]",
        question_text, question.resolution_criteria, evidence
    )
}

fn format_result(structured: &StructuredResolution) -> String {
    let evidence = structured
        .key_evidence
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Resolution: {}\nReasoning: {}\nKey Evidence:\n{}",
        structured.resolution_status, structured.reasoning, evidence
    )
}
