//! Automatic resolution and assessment of forecasting questions.
//!
//! The crate determines the truth-value of forecasting questions through a
//! pluggable [`Resolver`](resolver::Resolver) seam and benchmarks strategies
//! against already-resolved questions, producing a confusion-matrix
//! [`AssessmentReport`](assess::AssessmentReport) and a rendered markdown
//! artifact.

pub mod assess;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod resolver;
pub mod source;

pub use assess::{AssessmentReport, Assessor};
pub use config::ResolverConfig;
pub use error::{ResolverError, Result};
pub use model::{Question, QuestionType, Resolution, StructuredResolution};
pub use resolver::{ConsensusResolver, PipelineResolver, Resolver, ResolverVerdict};
pub use source::{FileSource, QuestionFilter, QuestionSource, StaticSource};
