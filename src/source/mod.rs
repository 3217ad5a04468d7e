//! Question sources.
//!
//! A [`QuestionSource`] hands questions to the assessment engine. The crate
//! ships [`StaticSource`] (in-memory, for tests and fixtures) and
//! [`FileSource`] (JSON files on disk); network-backed sources implement the
//! same trait externally.

mod file;

pub use file::FileSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};
use crate::model::{Question, QuestionStatus, QuestionType};

/// Reference to a single question, by numeric id or canonical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionRef {
    Id(u64),
    Url(String),
}

impl std::fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Declarative filter for listing questions. Empty vectors mean "no
/// constraint on that dimension".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    #[serde(default)]
    pub statuses: Vec<QuestionStatus>,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default)]
    pub scheduled_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_before: Option<DateTime<Utc>>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        if !self.question_types.is_empty() && !self.question_types.contains(&question.question_type)
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&question.status()) {
            return false;
        }
        if let Some(tournament) = &self.tournament {
            if !question.tournaments.contains(tournament) {
                return false;
            }
        }
        if let Some(after) = self.scheduled_after {
            if question.scheduled_resolution_time < after {
                return false;
            }
        }
        if let Some(before) = self.scheduled_before {
            if question.scheduled_resolution_time > before {
                return false;
            }
        }
        true
    }
}

/// Provider of questions for resolution and assessment.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch one question by numeric id. Unknown ids fail with
    /// [`ResolverError::QuestionNotFound`].
    async fn question_by_id(&self, id: u64) -> Result<Question>;

    /// Fetch one question by canonical URL.
    async fn question_by_url(&self, url: &str) -> Result<Question>;

    /// List all questions matching the filter, in source order.
    async fn questions_matching(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Dispatch on a [`QuestionRef`].
    async fn question_by_ref(&self, reference: &QuestionRef) -> Result<Question> {
        match reference {
            QuestionRef::Id(id) => self.question_by_id(*id).await,
            QuestionRef::Url(url) => self.question_by_url(url).await,
        }
    }
}

/// In-memory source over a fixed set of questions.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    questions: Vec<Question>,
}

impl StaticSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    async fn question_by_id(&self, id: u64) -> Result<Question> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| ResolverError::QuestionNotFound(id.to_string()))
    }

    async fn question_by_url(&self, url: &str) -> Result<Question> {
        self.questions
            .iter()
            .find(|q| q.canonical_url == url)
            .cloned()
            .ok_or_else(|| ResolverError::QuestionNotFound(url.to_string()))
    }

    async fn questions_matching(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resolution;

    fn fixture() -> StaticSource {
        StaticSource::new(vec![
            Question::binary(1, "Will A happen?")
                .with_ground_truth(Resolution::Positive, Utc::now()),
            Question::binary(2, "How many B?").with_type(QuestionType::Numeric),
        ])
    }

    #[tokio::test]
    async fn test_fetch_by_id_and_url() {
        let source = fixture();
        let by_id = source.question_by_id(1).await.unwrap();
        assert_eq!(by_id.id, 1);
        let by_url = source.question_by_url(&by_id.canonical_url).await.unwrap();
        assert_eq!(by_url.id, 1);
        let by_ref = source.question_by_ref(&QuestionRef::Id(2)).await.unwrap();
        assert_eq!(by_ref.id, 2);
    }

    #[tokio::test]
    async fn test_fetch_unknown_reference_fails() {
        let err = fixture().question_by_id(999).await.unwrap_err();
        assert!(matches!(err, ResolverError::QuestionNotFound(_)));
    }

    #[tokio::test]
    async fn test_filter_by_type_and_status() {
        let source = fixture();
        let binaries = source
            .questions_matching(&QuestionFilter {
                question_types: vec![QuestionType::Binary],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(binaries.len(), 1);

        let resolved = source
            .questions_matching(&QuestionFilter {
                statuses: vec![QuestionStatus::Resolved],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, 1);
    }

    #[tokio::test]
    async fn test_empty_filter_matches_everything() {
        let all = fixture()
            .questions_matching(&QuestionFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
