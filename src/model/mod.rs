//! Data model: questions, resolutions, and structured resolver output.

mod question;
mod resolution;

pub use question::{Question, QuestionStatus, QuestionType};
pub use resolution::{
    CancelKind, MAX_KEY_EVIDENCE, MIN_KEY_EVIDENCE, Resolution, ResolutionMetadata,
    ResolutionStatus, StructuredResolution,
};
