//! TOML-backed runtime configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolverError, Result};
use crate::model::QuestionType;

/// Top-level configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Settings for the orchestrated pipeline resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rewrite past-deadline questions into past tense before research.
    #[serde(default = "default_rephrase")]
    pub rephrase: bool,
    /// Broadcast capacity for streamed resolution events.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rephrase: default_rephrase(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Settings for the assessment engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Maximum questions resolved concurrently.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-question resolution timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Question types eligible for assessment.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<QuestionType>,
    /// Community prediction (percent) at or above which the consensus
    /// resolver answers Positive.
    #[serde(default = "default_consensus_positive")]
    pub consensus_positive_threshold: f64,
    /// Community prediction (percent) at or below which the consensus
    /// resolver answers Negative.
    #[serde(default = "default_consensus_negative")]
    pub consensus_negative_threshold: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
            allowed_types: default_allowed_types(),
            consensus_positive_threshold: default_consensus_positive(),
            consensus_negative_threshold: default_consensus_negative(),
        }
    }
}

/// Settings for rendered report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for rendered markdown reports; created if missing.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_rephrase() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_max_concurrent() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_allowed_types() -> Vec<QuestionType> {
    vec![QuestionType::Binary]
}

fn default_consensus_positive() -> f64 {
    95.0
}

fn default_consensus_negative() -> f64 {
    5.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl ResolverConfig {
    /// Load from a TOML file, falling back to defaults when it does not
    /// exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ResolverError::Config(format!("serialization failed: {}", e)))?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Validate all sections, collecting every violation into one error.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.assessment.max_concurrent == 0 {
            errors.push("assessment.max_concurrent must be at least 1".to_string());
        }
        if self.assessment.timeout_secs == 0 {
            errors.push("assessment.timeout_secs must be positive".to_string());
        }
        if self.assessment.allowed_types.is_empty() {
            errors.push("assessment.allowed_types must not be empty".to_string());
        }
        let positive = self.assessment.consensus_positive_threshold;
        let negative = self.assessment.consensus_negative_threshold;
        if !(0.0..=100.0).contains(&positive) || !(0.0..=100.0).contains(&negative) {
            errors.push("consensus thresholds must be percentages in 0..=100".to_string());
        }
        if negative >= positive {
            errors.push(format!(
                "consensus_negative_threshold ({}) must be below consensus_positive_threshold ({})",
                negative, positive
            ));
        }
        if self.pipeline.event_channel_capacity == 0 {
            errors.push("pipeline.event_channel_capacity must be at least 1".to_string());
        }
        if self.report.output_dir.as_os_str().is_empty() {
            errors.push("report.output_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ResolverError::Config(errors.join("; ")))
        }
    }
}
