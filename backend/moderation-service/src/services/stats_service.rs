use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{
    ModerationQueueItem, ModerationRule, ModerationStats, QueueStatus, RuleTriggerSummary,
    RECENT_ACTIVITY_LIMIT, TOP_RULES_LIMIT,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only statistics over a creator's rules and queue history
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn ModerationStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn get_moderation_stats(&self, creator_id: Uuid) -> Result<ModerationStats> {
        let rules = self.store.list_rules(creator_id, true).await?;
        let items = self.store.list_all_queue_items(creator_id).await?;

        Ok(compute_stats(&rules, &items, Local::now()))
    }
}

/// Start of the calendar day containing `now`, in `now`'s timezone
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Aggregate statistics. Linear in the size of the history.
pub fn compute_stats<Tz: TimeZone>(
    rules: &[ModerationRule],
    items: &[ModerationQueueItem],
    now: DateTime<Tz>,
) -> ModerationStats {
    let active_rules = rules.iter().filter(|r| r.is_active).count();

    let reviewed: Vec<&ModerationQueueItem> =
        items.iter().filter(|i| i.reviewed_at.is_some()).collect();

    let reviewed_today = match start_of_day(&now) {
        Some(midnight) => reviewed
            .iter()
            .filter(|i| i.reviewed_at.is_some_and(|at| at >= midnight))
            .count(),
        None => 0,
    };

    let (average_review_time, accuracy_rate) = if reviewed.is_empty() {
        (0.0, 0.0)
    } else {
        let total_minutes: f64 = reviewed.iter().filter_map(|i| i.review_minutes()).sum();
        let agreed = reviewed.iter().filter(|i| i.ai_agreed()).count();
        (
            total_minutes / reviewed.len() as f64,
            agreed as f64 / reviewed.len() as f64,
        )
    };

    let mut by_triggers: Vec<&ModerationRule> = rules.iter().collect();
    by_triggers.sort_by(|a, b| b.trigger_count.cmp(&a.trigger_count));
    let top_rules = by_triggers
        .into_iter()
        .take(TOP_RULES_LIMIT)
        .map(|rule| RuleTriggerSummary {
            id: rule.id,
            name: rule.name.clone(),
            severity: rule.severity,
            is_active: rule.is_active,
            trigger_count: rule.trigger_count,
        })
        .collect();

    let mut recent = reviewed;
    recent.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at));
    let recent_activity = recent
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .cloned()
        .collect();

    ModerationStats {
        total_rules: rules.len(),
        active_rules,
        inactive_rules: rules.len() - active_rules,
        total_items: items.len(),
        pending_items: items
            .iter()
            .filter(|i| i.status == QueueStatus::Pending)
            .count(),
        reviewed_today,
        average_review_time,
        accuracy_rate,
        top_rules,
        recent_activity,
    }
}
