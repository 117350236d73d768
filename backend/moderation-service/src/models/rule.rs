use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::action::ActionSpec;

/// Priority assigned to queue items that match no rule
pub const DEFAULT_PRIORITY: i32 = 5;
pub const DEFAULT_AI_CONFIDENCE_THRESHOLD: f64 = 0.85;
pub const DEFAULT_TOXICITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "moderation_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Queue priority (0-10) derived from rule severity
    pub fn priority(&self) -> i32 {
        match self {
            Severity::Critical => 10,
            Severity::High => 8,
            Severity::Medium => 5,
            Severity::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// A single matching condition of a rule.
///
/// A rule matches an incoming item when any of its conditions does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Item content type equals `content_type`
    ContentType { content_type: String },
    /// `ai_analysis.toxicity_score` is strictly above `threshold` (default 0.5)
    Toxicity {
        #[serde(default)]
        threshold: Option<f64>,
    },
}

impl RuleCondition {
    pub fn matches(&self, content_type: &str, ai_analysis: Option<&Value>) -> bool {
        match self {
            RuleCondition::ContentType {
                content_type: expected,
            } => expected == content_type,
            RuleCondition::Toxicity { threshold } => {
                let threshold = threshold.unwrap_or(DEFAULT_TOXICITY_THRESHOLD);
                toxicity_score(ai_analysis).is_some_and(|score| score > threshold)
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            RuleCondition::ContentType { content_type } if content_type.trim().is_empty() => {
                Err("content_type condition requires a non-empty content_type".to_string())
            }
            RuleCondition::Toxicity {
                threshold: Some(threshold),
            } if !(0.0..=1.0).contains(threshold) => Err(format!(
                "toxicity threshold must be within [0, 1], got {}",
                threshold
            )),
            _ => Ok(()),
        }
    }
}

fn toxicity_score(ai_analysis: Option<&Value>) -> Option<f64> {
    ai_analysis?.get("toxicity_score")?.as_f64()
}

/// Actions attached to a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleActions {
    /// Executed by the system when the rule auto-enforces
    #[serde(default)]
    pub auto_actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationRule {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: String,
    #[sqlx(json)]
    pub conditions: Vec<RuleCondition>,
    #[sqlx(json)]
    pub actions: RuleActions,
    pub severity: Severity,
    pub precedence: i32,
    pub is_active: bool,
    pub is_auto_enforce: bool,
    pub requires_human_review: bool,
    pub ai_confidence_threshold: f64,
    pub trigger_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModerationRule {
    /// Build a rule from creation input, applying defaults
    pub fn new(creator_id: Uuid, input: CreateRuleInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            creator_id,
            name: input.name,
            description: input.description,
            rule_type: input.rule_type,
            conditions: input.conditions,
            actions: input.actions,
            severity: input.severity.unwrap_or_default(),
            precedence: input.precedence.unwrap_or(0),
            is_active: true,
            is_auto_enforce: input.is_auto_enforce.unwrap_or(false),
            requires_human_review: input.requires_human_review.unwrap_or(true),
            ai_confidence_threshold: input
                .ai_confidence_threshold
                .unwrap_or(DEFAULT_AI_CONFIDENCE_THRESHOLD),
            trigger_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches(&self, content_type: &str, ai_analysis: Option<&Value>) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.matches(content_type, ai_analysis))
    }

    /// Whether an item with the given AI confidence is auto-enforced by this rule
    pub fn should_auto_enforce(&self, ai_confidence: Option<f64>) -> bool {
        self.is_auto_enforce
            && ai_confidence.is_some_and(|confidence| confidence >= self.ai_confidence_threshold)
    }
}

/// First matching rule, trying higher precedence first and newer rules before older.
///
/// `rules` is expected newest-first; the sort is stable so equal precedence keeps that order.
pub fn find_applicable_rule<'a>(
    rules: &'a [ModerationRule],
    content_type: &str,
    ai_analysis: Option<&Value>,
) -> Option<&'a ModerationRule> {
    let mut ordered: Vec<&ModerationRule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by(|a, b| b.precedence.cmp(&a.precedence));
    ordered
        .into_iter()
        .find(|rule| rule.matches(content_type, ai_analysis))
}

fn check_actions(actions: &[ActionSpec]) -> Result<(), String> {
    actions.iter().try_for_each(ActionSpec::validate)
}

fn check_conditions(conditions: &[RuleCondition]) -> Result<(), String> {
    conditions.iter().try_for_each(RuleCondition::validate)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateRuleInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub rule_type: String,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: RuleActions,
    pub severity: Option<Severity>,
    pub precedence: Option<i32>,
    pub is_auto_enforce: Option<bool>,
    pub requires_human_review: Option<bool>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_confidence_threshold: Option<f64>,
}

impl CreateRuleInput {
    pub fn check(&self) -> crate::error::Result<()> {
        self.validate()?;
        check_conditions(&self.conditions).map_err(crate::error::ModerationError::InvalidInput)?;
        check_actions(&self.actions.auto_actions)
            .map_err(crate::error::ModerationError::InvalidInput)?;
        Ok(())
    }
}

/// Partial rule update. `None` leaves a field untouched; an empty
/// `description` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRuleInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub rule_type: Option<String>,
    pub conditions: Option<Vec<RuleCondition>>,
    pub actions: Option<RuleActions>,
    pub severity: Option<Severity>,
    pub precedence: Option<i32>,
    pub is_active: Option<bool>,
    pub is_auto_enforce: Option<bool>,
    pub requires_human_review: Option<bool>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_confidence_threshold: Option<f64>,
}

impl UpdateRuleInput {
    pub fn check(&self) -> crate::error::Result<()> {
        self.validate()?;
        if let Some(conditions) = &self.conditions {
            check_conditions(conditions).map_err(crate::error::ModerationError::InvalidInput)?;
        }
        if let Some(actions) = &self.actions {
            check_actions(&actions.auto_actions)
                .map_err(crate::error::ModerationError::InvalidInput)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.rule_type.is_none()
            && self.conditions.is_none()
            && self.actions.is_none()
            && self.severity.is_none()
            && self.precedence.is_none()
            && self.is_active.is_none()
            && self.is_auto_enforce.is_none()
            && self.requires_human_review.is_none()
            && self.ai_confidence_threshold.is_none()
    }

    /// Merge the provided fields into `rule`
    pub fn apply_to(&self, rule: &mut ModerationRule) {
        if let Some(name) = &self.name {
            rule.name = name.clone();
        }
        if let Some(description) = &self.description {
            rule.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(rule_type) = &self.rule_type {
            rule.rule_type = rule_type.clone();
        }
        if let Some(conditions) = &self.conditions {
            rule.conditions = conditions.clone();
        }
        if let Some(actions) = &self.actions {
            rule.actions = actions.clone();
        }
        if let Some(severity) = self.severity {
            rule.severity = severity;
        }
        if let Some(precedence) = self.precedence {
            rule.precedence = precedence;
        }
        if let Some(is_active) = self.is_active {
            rule.is_active = is_active;
        }
        if let Some(is_auto_enforce) = self.is_auto_enforce {
            rule.is_auto_enforce = is_auto_enforce;
        }
        if let Some(requires_human_review) = self.requires_human_review {
            rule.requires_human_review = requires_human_review;
        }
        if let Some(threshold) = self.ai_confidence_threshold {
            rule.ai_confidence_threshold = threshold;
        }
        rule.updated_at = Utc::now();
    }
}
