use std::fmt;

use thiserror::Error;

/// Pipeline stage that a collaborator failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Rephrase,
    Research,
    Resolve,
    Parse,
    Classify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rephrase => "rephrase",
            Self::Research => "research",
            Self::Resolve => "resolve",
            Self::Parse => "parse",
            Self::Classify => "classify",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum ResolverError {
    /// A delegated research/model call failed. Transient from the batch's
    /// point of view: the question is excluded, siblings continue.
    #[error("{stage} stage failed: {message}")]
    Collaborator { stage: Stage, message: String },

    /// Structured-output parsing failed. The raw unparsed text is preserved
    /// for debugging and must never be discarded.
    #[error("failed to parse structured output: {reason}")]
    StructuredOutputParse { raw_output: String, reason: String },

    /// The extraction stage produced a status label outside the resolution
    /// vocabulary. A contract violation by the collaborator, raised loudly
    /// rather than defaulted.
    #[error("unknown resolution status label: {0:?}")]
    UnknownStatusLabel(String),

    /// `key_evidence` violated its cardinality contract.
    #[error("key_evidence must contain {min}..={max} items, got {got}")]
    KeyEvidenceBounds { got: usize, min: usize, max: usize },

    #[error("question {id} is not eligible for assessment: {reason}")]
    IneligibleQuestion { id: u64, reason: String },

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ResolverError {
    pub fn collaborator(stage: Stage, message: impl Into<String>) -> Self {
        Self::Collaborator {
            stage,
            message: message.into(),
        }
    }

    pub fn ineligible(id: u64, reason: impl Into<String>) -> Self {
        Self::IneligibleQuestion {
            id,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
