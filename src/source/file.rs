//! JSON-file question source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{QuestionFilter, QuestionSource};
use crate::error::{ResolverError, Result};
use crate::model::Question;

/// Loads questions from a JSON file holding an array of question objects.
///
/// The file is re-read on every call so edits between runs are picked up
/// without restarting.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Question>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        debug!(
            path = %self.path.display(),
            count = questions.len(),
            "loaded questions from file"
        );
        Ok(questions)
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    async fn question_by_id(&self, id: u64) -> Result<Question> {
        self.load()
            .await?
            .into_iter()
            .find(|q| q.id == id)
            .ok_or_else(|| ResolverError::QuestionNotFound(id.to_string()))
    }

    async fn question_by_url(&self, url: &str) -> Result<Question> {
        self.load()
            .await?
            .into_iter()
            .find(|q| q.canonical_url == url)
            .ok_or_else(|| ResolverError::QuestionNotFound(url.to_string()))
    }

    async fn questions_matching(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|q| filter.matches(q))
            .collect())
    }
}
