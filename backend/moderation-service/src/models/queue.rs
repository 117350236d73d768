use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::action::{ActionExecutionReport, ActionSpec};
use super::rule::ModerationRule;

pub const AUTO_REVIEW_NOTE: &str = "Auto-executed by AI moderation";

/// Queue item status. Items leave `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "queue_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Approved,
    Rejected,
    Escalated,
}

impl QueueStatus {
    /// Validate state transition (pending -> approved/rejected/escalated only)
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        *self == QueueStatus::Pending && next != QueueStatus::Pending
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Approved => "approved",
            QueueStatus::Rejected => "rejected",
            QueueStatus::Escalated => "escalated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_decision", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    Escalated,
}

impl ReviewDecision {
    pub fn status(&self) -> QueueStatus {
        match self {
            ReviewDecision::Approved => QueueStatus::Approved,
            ReviewDecision::Rejected => QueueStatus::Rejected,
            ReviewDecision::Escalated => QueueStatus::Escalated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.status().as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModerationQueueItem {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub content_type: String,
    pub content_id: String,
    pub content_data: Value,
    pub reported_user_id: Option<Uuid>,
    pub reporter_user_id: Option<Uuid>,
    pub triggered_rule_id: Option<Uuid>,
    pub priority: i32,
    pub ai_analysis: Option<Value>,
    pub ai_confidence: Option<f64>,
    pub ai_recommendation: Option<String>,
    pub status: QueueStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_decision: Option<ReviewDecision>,
    pub review_notes: Option<String>,
    #[sqlx(json)]
    pub actions_taken: Vec<ActionSpec>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModerationQueueItem {
    /// Minutes between flagging and review, if reviewed
    pub fn review_minutes(&self) -> Option<f64> {
        self.reviewed_at
            .map(|reviewed_at| (reviewed_at - self.created_at).num_milliseconds() as f64 / 60_000.0)
    }

    /// Whether the AI recommendation agreed with the final decision
    pub fn ai_agreed(&self) -> bool {
        match (&self.ai_recommendation, self.review_decision) {
            (Some(recommendation), Some(decision)) => recommendation == decision.as_str(),
            _ => false,
        }
    }
}

/// Queue item after a write, with the outcome of any actions it executed.
///
/// `actions` is empty when no action ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItemOutcome {
    #[serde(flatten)]
    pub item: ModerationQueueItem,
    pub actions: ActionExecutionReport,
}

impl QueueItemOutcome {
    pub fn without_actions(item: ModerationQueueItem) -> Self {
        Self {
            item,
            actions: ActionExecutionReport::default(),
        }
    }
}

/// Queue item together with the rule that triggered it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItemWithRule {
    #[serde(flatten)]
    pub item: ModerationQueueItem,
    pub triggered_rule: Option<ModerationRule>,
}

/// Flag submitted for moderation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AddToQueueInput {
    #[validate(length(min = 1, max = 64))]
    pub content_type: String,
    #[validate(length(min = 1, max = 255))]
    pub content_id: String,
    #[serde(default)]
    pub content_data: Option<Value>,
    pub reported_user_id: Option<Uuid>,
    pub reporter_user_id: Option<Uuid>,
    /// Overrides the severity-derived priority
    #[validate(range(min = 0, max = 10))]
    pub priority: Option<i32>,
    pub ai_analysis: Option<Value>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_confidence: Option<f64>,
    pub ai_recommendation: Option<String>,
}

/// Queue row to insert
#[derive(Debug, Clone)]
pub struct NewQueueItem {
    pub creator_id: Uuid,
    pub content_type: String,
    pub content_id: String,
    pub content_data: Value,
    pub reported_user_id: Option<Uuid>,
    pub reporter_user_id: Option<Uuid>,
    pub triggered_rule_id: Option<Uuid>,
    pub priority: i32,
    pub ai_analysis: Option<Value>,
    pub ai_confidence: Option<f64>,
    pub ai_recommendation: Option<String>,
}

impl NewQueueItem {
    pub fn new(
        creator_id: Uuid,
        input: AddToQueueInput,
        triggered_rule_id: Option<Uuid>,
        priority: i32,
    ) -> Self {
        Self {
            creator_id,
            content_type: input.content_type,
            content_id: input.content_id,
            content_data: input
                .content_data
                .unwrap_or_else(|| Value::Object(Default::default())),
            reported_user_id: input.reported_user_id,
            reporter_user_id: input.reporter_user_id,
            triggered_rule_id,
            priority,
            ai_analysis: input.ai_analysis,
            ai_confidence: input.ai_confidence,
            ai_recommendation: input.ai_recommendation,
        }
    }
}

/// Reviewer decision payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub decision: ReviewDecision,
    pub notes: Option<String>,
    #[serde(default)]
    pub actions_taken: Vec<ActionSpec>,
}

/// Review stamp applied to a pending item
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub status: QueueStatus,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
    pub review_decision: ReviewDecision,
    pub review_notes: Option<String>,
    pub actions_taken: Vec<ActionSpec>,
}

impl ReviewUpdate {
    pub fn apply_to(&self, item: &mut ModerationQueueItem) {
        item.status = self.status;
        item.reviewed_by = Some(self.reviewed_by.clone());
        item.reviewed_at = Some(self.reviewed_at);
        item.review_decision = Some(self.review_decision);
        item.review_notes = self.review_notes.clone();
        item.actions_taken = self.actions_taken.clone();
        item.updated_at = Utc::now();
    }
}
