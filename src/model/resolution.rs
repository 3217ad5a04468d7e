//! Resolution types and the structured output record produced by the
//! pipeline's parse stage.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};

/// Minimum number of key-evidence items in a structured resolution.
pub const MIN_KEY_EVIDENCE: usize = 3;
/// Maximum number of key-evidence items in a structured resolution.
pub const MAX_KEY_EVIDENCE: usize = 5;

/// Raw resolution vocabulary of the extraction stage.
///
/// Wire labels follow the upstream SCREAMING_CASE convention (`"TRUE"`,
/// `"NOT_YET_RESOLVABLE"`, ...). The enum is closed: any label outside this
/// set is rejected at the parse boundary with
/// [`ResolverError::UnknownStatusLabel`], never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    True,
    False,
    Ambiguous,
    Annulled,
    NotYetResolvable,
}

impl ResolutionStatus {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Ambiguous => "AMBIGUOUS",
            Self::Annulled => "ANNULLED",
            Self::NotYetResolvable => "NOT_YET_RESOLVABLE",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

impl FromStr for ResolutionStatus {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRUE" => Ok(Self::True),
            "FALSE" => Ok(Self::False),
            "AMBIGUOUS" => Ok(Self::Ambiguous),
            "ANNULLED" => Ok(Self::Annulled),
            "NOT_YET_RESOLVABLE" => Ok(Self::NotYetResolvable),
            other => Err(ResolverError::UnknownStatusLabel(other.to_string())),
        }
    }
}

/// Why a question was cancelled rather than resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelKind {
    /// The question is valid but its outcome is unclear or disputed.
    Ambiguous,
    /// A fundamental assumption of the question is false.
    Annulled,
}

impl fmt::Display for CancelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous => write!(f, "Ambiguous"),
            Self::Annulled => write!(f, "Annulled"),
        }
    }
}

/// A question's truth-value.
///
/// "Not yet resolvable" is deliberately not a variant: it is represented by
/// `Option<Resolution>::None` everywhere, so "no answer" and "answer is
/// Cancelled" can never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Positive,
    Negative,
    Cancelled(CancelKind),
}

impl Resolution {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "True"),
            Self::Negative => write!(f, "False"),
            Self::Cancelled(kind) => write!(f, "Cancelled ({})", kind),
        }
    }
}

/// Reasoning and supporting evidence produced alongside a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionMetadata {
    pub reasoning: String,
    pub key_evidence: Vec<String>,
}

/// Validated structured record extracted from a resolver's free-text decision.
///
/// Derives `JsonSchema` so extractor implementations can hand the target
/// shape to a language model for structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredResolution {
    /// The final resolution determination.
    pub resolution_status: ResolutionStatus,
    /// 2-4 sentence explanation of why this resolution was chosen.
    pub reasoning: String,
    /// 3-5 key pieces of evidence supporting this resolution.
    pub key_evidence: Vec<String>,
}

impl StructuredResolution {
    /// Build a structured resolution, enforcing the evidence cardinality
    /// contract.
    pub fn new(
        resolution_status: ResolutionStatus,
        reasoning: impl Into<String>,
        key_evidence: Vec<String>,
    ) -> Result<Self> {
        if !(MIN_KEY_EVIDENCE..=MAX_KEY_EVIDENCE).contains(&key_evidence.len()) {
            return Err(ResolverError::KeyEvidenceBounds {
                got: key_evidence.len(),
                min: MIN_KEY_EVIDENCE,
                max: MAX_KEY_EVIDENCE,
            });
        }
        Ok(Self {
            resolution_status,
            reasoning: reasoning.into(),
            key_evidence,
        })
    }

    /// Deterministically map the raw status to a typed resolution.
    ///
    /// Pure and total on the five defined statuses; `None` means "not yet
    /// resolvable". Unknown labels cannot reach this point because the enum
    /// is closed at the parse boundary.
    pub fn classify(&self) -> Option<Resolution> {
        match self.resolution_status {
            ResolutionStatus::True => Some(Resolution::Positive),
            ResolutionStatus::False => Some(Resolution::Negative),
            ResolutionStatus::Ambiguous => Some(Resolution::Cancelled(CancelKind::Ambiguous)),
            ResolutionStatus::Annulled => Some(Resolution::Cancelled(CancelKind::Annulled)),
            ResolutionStatus::NotYetResolvable => None,
        }
    }

    pub fn metadata(&self) -> ResolutionMetadata {
        ResolutionMetadata {
            reasoning: self.reasoning.clone(),
            key_evidence: self.key_evidence.clone(),
        }
    }
}
