//! Content analysis providers
//!
//! The queue only consumes analysis results; the classifier itself lives
//! outside this service. `RemoteAnalyzer` calls a model-serving endpoint and
//! `RandomAnalyzer` stands in for it when none is configured.

use crate::error::{ModerationError, Result};
use crate::models::{ContentAnalysis, ContentScores};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, content_type: &str, content: &Value) -> Result<ContentAnalysis>;
}

/// Placeholder classifier producing uniform random scores
#[derive(Debug, Default)]
pub struct RandomAnalyzer;

impl RandomAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn sample() -> (ContentScores, f64) {
        let mut rng = rand::thread_rng();
        let scores = ContentScores {
            toxicity_score: rng.gen_range(0.0..=1.0),
            spam_probability: rng.gen_range(0.0..=1.0),
            sentiment: rng.gen_range(-1.0..=1.0),
        };
        (scores, rng.gen_range(0.7..=1.0))
    }
}

#[async_trait]
impl ContentAnalyzer for RandomAnalyzer {
    async fn analyze(&self, content_type: &str, _content: &Value) -> Result<ContentAnalysis> {
        let (scores, confidence) = Self::sample();
        let analysis = ContentAnalysis::classify(scores, confidence);

        tracing::debug!(
            content_type = %content_type,
            toxicity = scores.toxicity_score,
            spam = scores.spam_probability,
            recommendation = %analysis.recommendation.as_str(),
            "Content analyzed (placeholder)"
        );

        Ok(analysis)
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    content_type: &'a str,
    content: &'a Value,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    toxicity_score: f64,
    spam_probability: f64,
    #[serde(default)]
    sentiment: f64,
    confidence: f64,
}

/// Classifier backed by an HTTP model-serving endpoint
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModerationError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ContentAnalyzer for RemoteAnalyzer {
    async fn analyze(&self, content_type: &str, content: &Value) -> Result<ContentAnalysis> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest {
                content_type,
                content,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::Analyzer(format!(
                "analyzer returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: AnalyzeResponse = response.json().await?;
        let scores = ContentScores {
            toxicity_score: body.toxicity_score.clamp(0.0, 1.0),
            spam_probability: body.spam_probability.clamp(0.0, 1.0),
            sentiment: body.sentiment.clamp(-1.0, 1.0),
        };

        Ok(ContentAnalysis::classify(
            scores,
            body.confidence.clamp(0.0, 1.0),
        ))
    }
}
