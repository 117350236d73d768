use serde::{Deserialize, Serialize};

use super::queue::ReviewDecision;

pub const HIGH_TOXICITY_THRESHOLD: f64 = 0.8;
pub const MODERATE_TOXICITY_THRESHOLD: f64 = 0.6;
pub const SPAM_THRESHOLD: f64 = 0.7;

/// Raw classifier scores, all in [0, 1] except sentiment in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentScores {
    pub toxicity_score: f64,
    pub spam_probability: f64,
    pub sentiment: f64,
}

/// Result of analysing one piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub analysis: ContentScores,
    pub confidence: f64,
    pub recommendation: ReviewDecision,
    pub flags: Vec<String>,
}

impl ContentAnalysis {
    /// Apply the fixed classification thresholds to raw scores
    pub fn classify(scores: ContentScores, confidence: f64) -> Self {
        let mut flags = Vec::new();
        let mut recommendation = ReviewDecision::Approved;

        if scores.toxicity_score > HIGH_TOXICITY_THRESHOLD {
            flags.push("high_toxicity".to_string());
            recommendation = ReviewDecision::Rejected;
        } else if scores.toxicity_score > MODERATE_TOXICITY_THRESHOLD {
            flags.push("moderate_toxicity".to_string());
            recommendation = ReviewDecision::Escalated;
        }

        if scores.spam_probability > SPAM_THRESHOLD {
            flags.push("likely_spam".to_string());
            recommendation = ReviewDecision::Rejected;
        }

        Self {
            analysis: scores,
            confidence,
            recommendation,
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(toxicity: f64, spam: f64) -> ContentScores {
        ContentScores {
            toxicity_score: toxicity,
            spam_probability: spam,
            sentiment: 0.0,
        }
    }

    #[test]
    fn test_clean_content_is_approved() {
        let result = ContentAnalysis::classify(scores(0.1, 0.1), 0.9);
        assert_eq!(result.recommendation, ReviewDecision::Approved);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_toxicity_bands() {
        let high = ContentAnalysis::classify(scores(0.85, 0.0), 0.9);
        assert_eq!(high.recommendation, ReviewDecision::Rejected);
        assert_eq!(high.flags, vec!["high_toxicity"]);

        let moderate = ContentAnalysis::classify(scores(0.7, 0.0), 0.9);
        assert_eq!(moderate.recommendation, ReviewDecision::Escalated);
        assert_eq!(moderate.flags, vec!["moderate_toxicity"]);

        let boundary = ContentAnalysis::classify(scores(0.6, 0.0), 0.9);
        assert_eq!(boundary.recommendation, ReviewDecision::Approved);
    }

    #[test]
    fn test_spam_overrides_escalation() {
        let result = ContentAnalysis::classify(scores(0.7, 0.75), 0.8);
        assert_eq!(result.recommendation, ReviewDecision::Rejected);
        assert_eq!(result.flags, vec!["moderate_toxicity", "likely_spam"]);
    }
}
