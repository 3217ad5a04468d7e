use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolution::Resolution;
use crate::error::{ResolverError, Result};

/// Basic question type as exposed by the question source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Binary,
    MultipleChoice,
    Numeric,
    Date,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Binary => "binary",
            Self::MultipleChoice => "multiple_choice",
            Self::Numeric => "numeric",
            Self::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle status derived from a question's resolution fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Open,
    Resolved,
}

/// A forecasting question. Read-only input to resolution and assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub resolution_criteria: String,
    pub scheduled_resolution_time: DateTime<Utc>,
    #[serde(default)]
    pub actual_resolution_time: Option<DateTime<Utc>>,
    /// The authoritative, already-known resolution, when the question has
    /// resolved. Used as the comparison baseline during assessment.
    #[serde(default)]
    pub ground_truth: Option<Resolution>,
    pub canonical_url: String,
    pub question_type: QuestionType,
    /// Community forecast (percent, 0-100) at access time, when available.
    #[serde(default)]
    pub community_prediction: Option<f64>,
    #[serde(default)]
    pub tournaments: Vec<String>,
}

impl Question {
    /// Create a binary question with the given id and text. Remaining fields
    /// are filled via the `with_*` builders.
    pub fn binary(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            resolution_criteria: String::new(),
            scheduled_resolution_time: Utc::now(),
            actual_resolution_time: None,
            ground_truth: None,
            canonical_url: format!("https://example.com/questions/{}", id),
            question_type: QuestionType::Binary,
            community_prediction: None,
            tournaments: Vec::new(),
        }
    }

    pub fn with_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }

    pub fn with_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.resolution_criteria = criteria.into();
        self
    }

    pub fn with_scheduled_resolution(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_resolution_time = at;
        self
    }

    pub fn with_ground_truth(mut self, resolution: Resolution, resolved_at: DateTime<Utc>) -> Self {
        self.ground_truth = Some(resolution);
        self.actual_resolution_time = Some(resolved_at);
        self
    }

    pub fn with_community_prediction(mut self, percent: f64) -> Self {
        self.community_prediction = Some(percent);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = url.into();
        self
    }

    pub fn status(&self) -> QuestionStatus {
        if self.actual_resolution_time.is_some() {
            QuestionStatus::Resolved
        } else {
            QuestionStatus::Open
        }
    }

    /// Check whether this question can participate in an assessment run.
    ///
    /// Eligible iff it has actually resolved, carries a ground-truth
    /// resolution, and its type is in the allow-list.
    pub fn check_eligibility(&self, allowed_types: &[QuestionType]) -> Result<()> {
        if self.actual_resolution_time.is_none() {
            return Err(ResolverError::ineligible(self.id, "question is not yet resolved"));
        }
        if self.ground_truth.is_none() {
            return Err(ResolverError::ineligible(
                self.id,
                "question has no ground-truth resolution",
            ));
        }
        if !allowed_types.contains(&self.question_type) {
            return Err(ResolverError::ineligible(
                self.id,
                format!("question type {} is not in the allow-list", self.question_type),
            ));
        }
        Ok(())
    }
}
