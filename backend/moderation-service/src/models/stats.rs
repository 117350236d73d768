use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::queue::ModerationQueueItem;
use super::rule::Severity;

/// Number of rules reported in `top_rules`
pub const TOP_RULES_LIMIT: usize = 5;
/// Number of reviewed items reported in `recent_activity`
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTriggerSummary {
    pub id: Uuid,
    pub name: String,
    pub severity: Severity,
    pub is_active: bool,
    pub trigger_count: i64,
}

/// Descriptive statistics over a creator's rules and queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationStats {
    pub total_rules: usize,
    pub active_rules: usize,
    pub inactive_rules: usize,
    pub total_items: usize,
    pub pending_items: usize,
    /// Items reviewed since local midnight
    pub reviewed_today: usize,
    /// Mean minutes from flagging to review
    pub average_review_time: f64,
    /// Fraction of reviewed items whose AI recommendation matched the decision
    pub accuracy_rate: f64,
    pub top_rules: Vec<RuleTriggerSummary>,
    pub recent_activity: Vec<ModerationQueueItem>,
}
